//! Pipe endpoints: caller streams bound to the engine's stdin (`pipe:0`) and stdout (`pipe:1`).

pub(crate) mod frame;
pub(crate) mod pump;
pub(crate) mod sink;
pub(crate) mod source;
