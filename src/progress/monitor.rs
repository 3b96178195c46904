use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use crate::foundation::error::{FfError, FfResult};
use crate::progress::parser::{ProgressEvent, fraction, parse_elapsed};

type FractionCallback = Box<dyn FnMut(f64) + Send>;
type ElapsedCallback = Box<dyn FnMut(Duration) + Send>;

enum Observer {
    Fraction {
        total: Duration,
        callback: FractionCallback,
    },
    Elapsed(ElapsedCallback),
}

impl Observer {
    fn event_for(&self, elapsed: Duration) -> Option<ProgressEvent> {
        match self {
            Self::Fraction { total, .. } => fraction(elapsed, *total).map(ProgressEvent::Fraction),
            Self::Elapsed(_) => Some(ProgressEvent::Elapsed(elapsed)),
        }
    }

    fn deliver(&mut self, event: ProgressEvent) -> bool {
        let outcome = match (self, event) {
            (Self::Fraction { callback, .. }, ProgressEvent::Fraction(v)) => {
                catch_unwind(AssertUnwindSafe(|| callback(v)))
            }
            (Self::Elapsed(callback), ProgressEvent::Elapsed(d)) => {
                catch_unwind(AssertUnwindSafe(|| callback(d)))
            }
            _ => return false,
        };
        if outcome.is_err() {
            tracing::warn!(?event, "progress observer panicked");
        }
        true
    }
}

/// Dispatches progress parsed from diagnostic lines to registered observers.
///
/// Observers run on the diagnostic reader thread, in registration order. A panicking observer is
/// logged and skipped; it never affects the others or the run.
#[derive(Default)]
pub struct ProgressMonitor {
    observers: Vec<Observer>,
}

impl ProgressMonitor {
    /// Create a monitor without observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fractional observer against an expected total media duration.
    ///
    /// A zero `total` is rejected.
    pub fn on_fraction(
        &mut self,
        total: Duration,
        callback: impl FnMut(f64) + Send + 'static,
    ) -> FfResult<()> {
        if total.is_zero() {
            return Err(FfError::configuration(
                "fractional progress requires a non-zero total duration",
            ));
        }
        self.observers.push(Observer::Fraction {
            total,
            callback: Box::new(callback),
        });
        Ok(())
    }

    /// Register an elapsed-media-time observer.
    pub fn on_elapsed(&mut self, callback: impl FnMut(Duration) + Send + 'static) {
        self.observers.push(Observer::Elapsed(Box::new(callback)));
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Feed one diagnostic line. Returns the number of events delivered, `None` when the line
    /// carries no progress.
    pub fn observe_line(&mut self, line: &str) -> Option<u64> {
        let elapsed = parse_elapsed(line)?;
        let mut delivered = 0;
        for observer in &mut self.observers {
            if let Some(event) = observer.event_for(elapsed)
                && observer.deliver(event)
            {
                delivered += 1;
            }
        }
        Some(delivered)
    }

    /// Deliver the terminal `Fraction(1.0)` to fractional observers after a successful run.
    pub fn finish(&mut self) -> u64 {
        let mut delivered = 0;
        for observer in &mut self.observers {
            if observer.deliver(ProgressEvent::Fraction(1.0)) {
                delivered += 1;
            }
        }
        delivered
    }
}

impl fmt::Debug for ProgressMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressMonitor")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/monitor.rs"]
mod tests;
