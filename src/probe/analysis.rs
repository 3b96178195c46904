use std::time::Duration;

use crate::foundation::core::FrameSize;
use crate::foundation::error::{FfError, FfResult};

/// Stream class as reported by `codec_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Video stream.
    Video,
    /// Audio stream.
    Audio,
    /// Subtitle stream.
    Subtitle,
    /// Data stream.
    Data,
    /// Attachment or unknown stream type.
    Other,
}

impl StreamKind {
    fn from_codec_type(raw: Option<&str>) -> Self {
        match raw {
            Some("video") => Self::Video,
            Some("audio") => Self::Audio,
            Some("subtitle") => Self::Subtitle,
            Some("data") => Self::Data,
            _ => Self::Other,
        }
    }
}

/// One stream of a probed file.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StreamInfo {
    /// Stream index within the container.
    pub index: u32,
    /// Stream class.
    pub kind: StreamKind,
    /// Codec short name (`h264`, `mpeg4`, `aac`, ...).
    pub codec_name: Option<String>,
    /// Width in pixels (video only).
    pub width: Option<u32>,
    /// Height in pixels (video only).
    pub height: Option<u32>,
    /// Pixel format (video only).
    pub pixel_format: Option<String>,
    /// Frame rate from `r_frame_rate` (video only).
    pub frame_rate: Option<f64>,
    /// Stream duration, when the container reports one.
    pub duration: Option<Duration>,
}

impl StreamInfo {
    /// Geometry of a video stream.
    pub fn frame_size(&self) -> Option<FrameSize> {
        Some(FrameSize::new(self.width?, self.height?))
    }
}

/// Read-only description of a media file.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MediaAnalysis {
    /// Container format name(s), comma-separated as reported.
    pub format_name: Option<String>,
    /// Container duration.
    pub duration: Option<Duration>,
    /// Streams in container order.
    pub streams: Vec<StreamInfo>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl MediaAnalysis {
    /// Parse `ffprobe -print_format json -show_format -show_streams` output.
    pub fn from_json(raw: &[u8]) -> FfResult<Self> {
        let parsed: ProbeOut = serde_json::from_slice(raw)
            .map_err(|e| FfError::probe(format!("ffprobe json parse failed: {e}")))?;
        let (format_name, duration) = match parsed.format {
            Some(f) => (f.format_name, parse_seconds(f.duration.as_deref())),
            None => (None, None),
        };
        let streams = parsed
            .streams
            .into_iter()
            .map(|s| StreamInfo {
                index: s.index,
                kind: StreamKind::from_codec_type(s.codec_type.as_deref()),
                codec_name: s.codec_name,
                width: s.width,
                height: s.height,
                pixel_format: s.pix_fmt,
                frame_rate: s.r_frame_rate.as_deref().and_then(parse_ratio),
                duration: parse_seconds(s.duration.as_deref()),
            })
            .collect();
        Ok(Self {
            format_name,
            duration,
            streams,
        })
    }

    /// First video stream.
    pub fn primary_video(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind == StreamKind::Video)
    }

    /// First audio stream.
    pub fn primary_audio(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind == StreamKind::Audio)
    }
}

fn parse_seconds(raw: Option<&str>) -> Option<Duration> {
    let secs = raw?.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn parse_ratio(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    if num == 0.0 || den == 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
#[path = "../../tests/unit/probe/analysis.rs"]
mod tests;
