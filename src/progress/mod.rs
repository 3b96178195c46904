//! Progress extraction from the engine's diagnostic stream.

pub(crate) mod monitor;
pub(crate) mod parser;
