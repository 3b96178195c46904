use std::fmt;
use std::time::Duration;

use crate::foundation::error::{FfError, FfResult};

/// Frame geometry in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a frame size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated rational frame rate.
    pub fn new(num: u32, den: u32) -> FfResult<Self> {
        if num == 0 || den == 0 {
            return Err(FfError::configuration("fps num/den must be non-zero"));
        }
        Ok(Self { num, den })
    }

    /// Whole frames per second.
    pub fn integer(num: u32) -> FfResult<Self> {
        Self::new(num, 1)
    }

    /// Frame rate as floating point.
    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Render as an ffmpeg rate token (`25` or `30000/1001`).
    pub fn to_arg(self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        }
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 25, den: 1 }
    }
}

/// Format a duration the way ffmpeg expects time arguments (`HH:MM:SS.mmm`).
pub fn format_timestamp(d: Duration) -> String {
    let total_ms = d.as_millis();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Parse an ffmpeg timestamp (`[-]H+:MM:SS[.frac]` or plain seconds).
///
/// Negative timestamps (emitted while the muxer is still priming) clamp to zero. `N/A` and other
/// malformed values yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if body.is_empty() {
        return None;
    }

    let parts: Vec<&str> = body.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
        [s] => (0, 0, *s),
        _ => return None,
    };
    if parts.len() == 3 && minutes >= 60 {
        return None;
    }

    let (whole, frac) = match seconds.split_once('.') {
        Some((w, f)) => (w, f),
        None => (seconds, ""),
    };
    let whole = whole.parse::<u64>().ok()?;
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut nanos_digits: String = frac.chars().take(9).collect();
    while nanos_digits.len() < 9 {
        nanos_digits.push('0');
    }
    let nanos = nanos_digits.parse::<u32>().ok()?;

    if negative {
        return Some(Duration::ZERO);
    }
    let secs = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60)?
        .checked_add(whole)?;
    Some(Duration::new(secs, nanos))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
