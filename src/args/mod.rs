//! Typed arguments, the argument collection and command rendering.

pub(crate) mod argument;
pub(crate) mod collection;
pub(crate) mod command;
