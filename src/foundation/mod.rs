pub(crate) mod cancel;
pub(crate) mod config;
pub(crate) mod core;
pub(crate) mod error;
