//! Process orchestration: spawning, pumping, cancellation and result classification.

pub(crate) mod diagnostics;
pub(crate) mod handle;
pub(crate) mod outcome;
pub(crate) mod processor;
pub(crate) mod runner;
pub(crate) mod terminate;
