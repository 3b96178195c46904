use std::time::Duration;

use crate::foundation::core::parse_timestamp;

/// Structured progress derived from one diagnostic line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Completed fraction of the caller-supplied total duration, in `[0, 1]`.
    Fraction(f64),
    /// Media time processed so far.
    Elapsed(Duration),
}

/// Keys carrying processed media time: the stats line's `time=` and `-progress`'s `out_time=`.
const TIME_KEYS: [&str; 2] = ["time", "out_time"];

/// Extract the processed media time from a diagnostic line.
///
/// Scans whitespace-separated `key=value` tokens; the last recognized one wins. `N/A` values are
/// ignored and negative times clamp to zero.
pub fn parse_elapsed(line: &str) -> Option<Duration> {
    line.split_whitespace()
        .filter_map(|token| token.split_once('='))
        .filter(|(key, _)| TIME_KEYS.contains(key))
        .filter_map(|(_, value)| parse_timestamp(value))
        .last()
}

/// `elapsed / total`, clamped to `[0, 1]`. `None` for a zero total.
pub fn fraction(elapsed: Duration, total: Duration) -> Option<f64> {
    if total.is_zero() {
        return None;
    }
    Some((elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/progress/parser.rs"]
mod tests;
