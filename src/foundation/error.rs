use crate::process::outcome::RunFailure;

/// Convenience result type used across ffweave.
pub type FfResult<T> = Result<T, FfError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Pump faults and cancellation are not errors: they are recorded in the
/// [`RunResult`](crate::RunResult) of the run they belong to.
#[derive(thiserror::Error, Debug)]
pub enum FfError {
    /// Invalid or incompatible argument collection, detected before any process is spawned.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The engine binary could not be started (missing binary, permission denied, ...).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that was being started.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The engine ran to completion but reported failure.
    #[error("runtime failure: {0}")]
    Runtime(Box<RunFailure>),

    /// Metadata probing failed or returned unparsable output.
    #[error("probe error: {0}")]
    Probe(String),

    /// I/O failure outside of the pump and diagnostic paths.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FfError {
    /// Build a [`FfError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`FfError::Spawn`] value.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Build a [`FfError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Return the captured failure when this is a [`FfError::Runtime`].
    pub fn run_failure(&self) -> Option<&RunFailure> {
        match self {
            Self::Runtime(failure) => Some(&**failure),
            _ => None,
        }
    }
}

impl From<RunFailure> for FfError {
    fn from(failure: RunFailure) -> Self {
        Self::Runtime(Box::new(failure))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
