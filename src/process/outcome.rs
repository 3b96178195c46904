use std::fmt;
use std::io;
use std::time::Duration;

use crate::foundation::error::{FfError, FfResult};

/// Which pipe endpoint a pump fault belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpEndpoint {
    /// Caller stream feeding the engine's stdin.
    Source,
    /// Caller stream receiving the engine's stdout.
    Sink,
}

impl fmt::Display for PumpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Sink => "sink",
        })
    }
}

/// A pipe endpoint's stream failed mid-run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PumpFault {
    /// Endpoint whose pump failed.
    pub endpoint: PumpEndpoint,
    /// Kind of the underlying I/O error.
    #[serde(skip)]
    pub kind: io::ErrorKind,
    /// Rendered error message.
    pub message: String,
}

impl PumpFault {
    /// Record an I/O failure of `endpoint`.
    pub fn from_io(endpoint: PumpEndpoint, err: &io::Error) -> Self {
        Self {
            endpoint,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Record a pump thread that panicked.
    pub(crate) fn panicked(endpoint: PumpEndpoint) -> Self {
        Self {
            endpoint,
            kind: io::ErrorKind::Other,
            message: format!("{endpoint} pump panicked"),
        }
    }

    /// Whether this fault may be ignored given the engine's exit code.
    ///
    /// The engine closing stdin before the source is exhausted (for example with `-t`) shows up as
    /// a broken pipe on the source side; that is harmless when the engine itself succeeded.
    pub fn is_recoverable(&self, exit_code: Option<i32>) -> bool {
        self.endpoint == PumpEndpoint::Source
            && self.kind == io::ErrorKind::BrokenPipe
            && exit_code == Some(0)
    }
}

impl fmt::Display for PumpFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pump: {}", self.endpoint, self.message)
    }
}

/// Structured description of a failed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunFailure {
    /// Engine exit code; `None` when it was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Unrecoverable pump faults.
    pub pump_faults: Vec<PumpFault>,
    /// Tail of the diagnostic stream.
    pub diagnostics: String,
}

impl RunFailure {
    /// Last non-empty diagnostic line, usually the engine's own error message.
    pub fn last_diagnostic(&self) -> Option<&str> {
        self.diagnostics
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "engine exited with code {code}")?,
            None => f.write_str("engine terminated by signal")?,
        }
        for fault in &self.pump_faults {
            write!(f, "; {fault}")?;
        }
        if let Some(line) = self.last_diagnostic() {
            write!(f, ": {line}")?;
        }
        Ok(())
    }
}

/// Per-run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunStats {
    /// Bytes pumped into the engine's stdin.
    pub bytes_in: u64,
    /// Bytes pumped out of the engine's stdout.
    pub bytes_out: u64,
    /// Diagnostic lines read from stderr.
    pub diagnostic_lines: u64,
    /// Progress events dispatched to observers.
    pub progress_events: u64,
}

/// Terminal outcome of one run.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// `true` iff the engine exited with code 0 and no unrecoverable pump fault was recorded.
    pub success: bool,
    /// Engine exit code, when it exited normally.
    pub exit_code: Option<i32>,
    /// The run was cancelled by the caller.
    pub cancelled: bool,
    /// Tail-bounded diagnostic text.
    pub diagnostics: String,
    /// Failure details; `None` on success and on cancellation.
    pub failure: Option<RunFailure>,
    /// Every pump fault observed, including recoverable ones.
    pub pump_faults: Vec<PumpFault>,
    /// Per-run counters.
    pub stats: RunStats,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunResult {
    pub(crate) fn cancelled_before_spawn() -> Self {
        Self {
            success: false,
            exit_code: None,
            cancelled: true,
            diagnostics: String::new(),
            failure: None,
            pump_faults: Vec::new(),
            stats: RunStats::default(),
            elapsed: Duration::ZERO,
        }
    }

    /// Turn a failed run into [`FfError::Runtime`]. Successful and cancelled runs pass through.
    pub fn into_checked(self) -> FfResult<Self> {
        match self.failure {
            Some(failure) => Err(FfError::from(failure)),
            None => Ok(self),
        }
    }
}

/// Classifier decision for a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Exit code 0 and no unrecoverable pump fault.
    Succeeded,
    /// The caller cancelled the run.
    Cancelled,
    /// The run failed.
    Failed(RunFailure),
}

/// Decide whether a finished run succeeded.
pub fn classify(
    exit_code: Option<i32>,
    pump_faults: &[PumpFault],
    cancelled: bool,
    diagnostics: &str,
) -> Verdict {
    if cancelled {
        return Verdict::Cancelled;
    }
    let fatal: Vec<PumpFault> = pump_faults
        .iter()
        .filter(|f| !f.is_recoverable(exit_code))
        .cloned()
        .collect();
    if exit_code == Some(0) && fatal.is_empty() {
        return Verdict::Succeeded;
    }
    Verdict::Failed(RunFailure {
        exit_code,
        pump_faults: fatal,
        diagnostics: diagnostics.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/process/outcome.rs"]
mod tests;
