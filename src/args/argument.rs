use std::time::Duration;

use crate::foundation::core::{Fps, FrameSize, format_timestamp};

/// Where an argument goes relative to the `-i` input markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Before the first input (input options such as `-ss`).
    PreInput,
    /// After the last input, before the output (output options).
    PostInput,
}

/// Stream class an argument applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Video streams (`v`).
    Video,
    /// Audio streams (`a`).
    Audio,
    /// Subtitle streams (`s`).
    Subtitle,
    /// Every stream.
    All,
}

impl Channel {
    fn suffixed(self, flag: &str) -> String {
        match self {
            Self::Video => format!("{flag}:v"),
            Self::Audio => format!("{flag}:a"),
            Self::Subtitle => format!("{flag}:s"),
            Self::All => flag.to_string(),
        }
    }
}

/// `-c:v <codec>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoCodec(pub String);

/// `-c:a <codec>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioCodec(pub String);

/// `scale=W:H` video filter. `None` keeps the aspect ratio for that side (`-1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    /// Target width, or `None` for auto.
    pub width: Option<u32>,
    /// Target height, or `None` for auto.
    pub height: Option<u32>,
}

impl Scale {
    /// Explicit width and height.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Fixed width, height derived from the aspect ratio.
    pub fn to_width(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }

    /// Fixed height, width derived from the aspect ratio.
    pub fn to_height(height: u32) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }

    /// Both sides from a frame size.
    pub fn from_size(size: FrameSize) -> Self {
        Self::new(size.width, size.height)
    }

    /// Filter expression, `-1` standing in for auto sides.
    pub fn expression(&self) -> String {
        let side = |v: Option<u32>| v.map_or_else(|| "-1".to_string(), |v| v.to_string());
        format!("scale={}:{}", side(self.width), side(self.height))
    }

    /// Output geometry for a source of `source` size.
    pub fn apply(&self, source: FrameSize) -> FrameSize {
        let derive = |fixed: u32, num: u32, den: u32| -> u32 {
            if den == 0 {
                return 0;
            }
            (f64::from(fixed) * f64::from(num) / f64::from(den)).round() as u32
        };
        match (self.width, self.height) {
            (Some(w), Some(h)) => FrameSize::new(w, h),
            (Some(w), None) => FrameSize::new(w, derive(w, source.height, source.width)),
            (None, Some(h)) => FrameSize::new(derive(h, source.width, source.height), h),
            (None, None) => source,
        }
    }
}

/// Raw video filter expression, merged with other filters into a single `-vf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFilter(pub String);

/// `-f <format>` on the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForceFormat(pub String);

/// `-pix_fmt <format>` on the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelFormat(pub String);

/// `-t <duration>`: stop writing output after this much media time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationLimit(pub Duration);

/// `-ss <position>` before the input: start decoding at this position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seek(pub Duration);

/// `-r <fps>` on the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRate(pub Fps);

/// `-c[:x] copy`: pass streams through without re-encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamCopy(pub Channel);

/// `-bsf[:x] <filter>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitStreamFilter {
    /// Streams the filter applies to.
    pub channel: Channel,
    /// Filter name, e.g. `h264_mp4toannexb`.
    pub filter: String,
}

/// `-threads <n>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Threads(pub u32);

/// `-vn`, `-an`, `-sn`: drop a stream class from the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisableChannel(pub Channel);

/// `-movflags <flags>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovFlags(pub String);

/// Verbatim tokens at a chosen placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomArgument {
    /// Where the tokens go.
    pub placement: Placement,
    /// Tokens, passed through unchanged.
    pub tokens: Vec<String>,
}

impl CustomArgument {
    /// Post-input tokens.
    pub fn post_input<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            placement: Placement::PostInput,
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Pre-input tokens.
    pub fn pre_input<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            placement: Placement::PreInput,
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

/// One unit of command configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    /// See [`VideoCodec`].
    VideoCodec(VideoCodec),
    /// See [`AudioCodec`].
    AudioCodec(AudioCodec),
    /// See [`Scale`].
    Scale(Scale),
    /// See [`VideoFilter`].
    VideoFilter(VideoFilter),
    /// See [`ForceFormat`].
    ForceFormat(ForceFormat),
    /// See [`PixelFormat`].
    PixelFormat(PixelFormat),
    /// See [`DurationLimit`].
    DurationLimit(DurationLimit),
    /// See [`Seek`].
    Seek(Seek),
    /// See [`FrameRate`].
    FrameRate(FrameRate),
    /// See [`StreamCopy`].
    StreamCopy(StreamCopy),
    /// See [`BitStreamFilter`].
    BitStreamFilter(BitStreamFilter),
    /// See [`Threads`].
    Threads(Threads),
    /// See [`DisableChannel`].
    DisableChannel(DisableChannel),
    /// See [`MovFlags`].
    MovFlags(MovFlags),
    /// See [`CustomArgument`].
    Custom(CustomArgument),
}

impl Argument {
    /// Placement relative to the input markers.
    pub fn placement(&self) -> Placement {
        match self {
            Self::Seek(_) => Placement::PreInput,
            Self::Custom(c) => c.placement,
            _ => Placement::PostInput,
        }
    }

    /// Video filter expression when this argument contributes to the `-vf` chain.
    pub fn filter_expression(&self) -> Option<String> {
        match self {
            Self::Scale(s) => Some(s.expression()),
            Self::VideoFilter(f) => Some(f.0.clone()),
            _ => None,
        }
    }

    /// Tokens for this argument on its own.
    ///
    /// Filter arguments render as a standalone `-vf`; the command builder merges them instead.
    pub fn render(&self) -> Vec<String> {
        let pair = |flag: &str, value: String| vec![flag.to_string(), value];
        match self {
            Self::VideoCodec(c) => pair("-c:v", c.0.clone()),
            Self::AudioCodec(c) => pair("-c:a", c.0.clone()),
            Self::Scale(_) | Self::VideoFilter(_) => {
                pair("-vf", self.filter_expression().unwrap_or_default())
            }
            Self::ForceFormat(f) => pair("-f", f.0.clone()),
            Self::PixelFormat(p) => pair("-pix_fmt", p.0.clone()),
            Self::DurationLimit(d) => pair("-t", format_timestamp(d.0)),
            Self::Seek(s) => pair("-ss", format_timestamp(s.0)),
            Self::FrameRate(r) => pair("-r", r.0.to_arg()),
            Self::StreamCopy(c) => pair(&c.0.suffixed("-c"), "copy".to_string()),
            Self::BitStreamFilter(b) => pair(&b.channel.suffixed("-bsf"), b.filter.clone()),
            Self::Threads(t) => pair("-threads", t.0.to_string()),
            Self::DisableChannel(d) => match d.0 {
                Channel::Video => vec!["-vn".to_string()],
                Channel::Audio => vec!["-an".to_string()],
                Channel::Subtitle => vec!["-sn".to_string()],
                Channel::All => ["-vn", "-an", "-sn"].map(String::from).to_vec(),
            },
            Self::MovFlags(m) => pair("-movflags", m.0.clone()),
            Self::Custom(c) => c.tokens.clone(),
        }
    }
}

/// Typed lookup of one [`Argument`] variant.
pub trait ArgumentKind: Sized {
    /// Borrow the payload when `arg` is this variant.
    fn extract(arg: &Argument) -> Option<&Self>;
}

macro_rules! argument_kinds {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl ArgumentKind for $ty {
                fn extract(arg: &Argument) -> Option<&Self> {
                    match arg {
                        Argument::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::$variant(value)
                }
            }
        )*
    };
}

argument_kinds! {
    VideoCodec => VideoCodec,
    AudioCodec => AudioCodec,
    Scale => Scale,
    VideoFilter => VideoFilter,
    ForceFormat => ForceFormat,
    PixelFormat => PixelFormat,
    DurationLimit => DurationLimit,
    Seek => Seek,
    FrameRate => FrameRate,
    StreamCopy => StreamCopy,
    BitStreamFilter => BitStreamFilter,
    Threads => Threads,
    DisableChannel => DisableChannel,
    MovFlags => MovFlags,
    Custom => CustomArgument,
}

#[cfg(test)]
#[path = "../../tests/unit/args/argument.rs"]
mod tests;
