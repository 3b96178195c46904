use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::args::argument::{
    Argument, ArgumentKind, AudioCodec, Channel, CustomArgument, DisableChannel, DurationLimit,
    ForceFormat, FrameRate, MovFlags, PixelFormat, Placement, Scale, Seek, StreamCopy, VideoCodec,
    VideoFilter,
};
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{FfError, FfResult};
use crate::pipes::sink::PipeSink;
use crate::pipes::source::PipeSource;
use crate::process::processor::FfmpegProcessor;

/// Containers whose muxer needs to seek back into the output, which a pipe cannot do.
const SEEKABLE_ONLY_FORMATS: [&str; 8] = ["mp4", "mov", "ipod", "ismv", "3gp", "3g2", "f4v", "psp"];

/// One `-i` input.
pub enum Input {
    /// Filesystem path.
    File(PathBuf),
    /// Caller stream bound to the engine's stdin.
    Pipe(Box<dyn PipeSource>),
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Pipe(source) => f.debug_tuple("Pipe").field(&source.stream_args()).finish(),
        }
    }
}

/// The run's output target.
pub enum Output {
    /// Filesystem path; `overwrite` selects `-y` over `-n`.
    File {
        /// Output path.
        path: PathBuf,
        /// Replace an existing file.
        overwrite: bool,
    },
    /// Caller stream bound to the engine's stdout.
    Pipe(Box<dyn PipeSink>),
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, overwrite } => f
                .debug_struct("File")
                .field("path", path)
                .field("overwrite", overwrite)
                .finish(),
            Self::Pipe(sink) => f.debug_tuple("Pipe").field(&sink.stream_args()).finish(),
        }
    }
}

/// Ordered description of one invocation: inputs, arguments and the output target.
#[derive(Debug, Default)]
pub struct Arguments {
    inputs: Vec<Input>,
    arguments: Vec<Argument>,
    output: Option<Output>,
}

impl Arguments {
    /// Empty collection; add at least one input and an output before running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a single input file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new().add_file_input(path)
    }

    /// Start from several input files, in order.
    pub fn from_files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .fold(Self::new(), |args, path| args.add_file_input(path))
    }

    /// Start from a pipe source bound to stdin.
    pub fn from_pipe(source: impl PipeSource + 'static) -> Self {
        Self::new().add_pipe_input(source)
    }

    /// Append a file input.
    pub fn add_file_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(Input::File(path.into()));
        self
    }

    /// Append a pipe input. Only one pipe input per run is supported.
    pub fn add_pipe_input(mut self, source: impl PipeSource + 'static) -> Self {
        self.inputs.push(Input::Pipe(Box::new(source)));
        self
    }

    /// Append an argument.
    pub fn with(mut self, argument: impl Into<Argument>) -> Self {
        self.push(argument);
        self
    }

    /// Append an argument in place.
    pub fn push(&mut self, argument: impl Into<Argument>) {
        self.arguments.push(argument.into());
    }

    /// `-c:v <codec>`.
    pub fn with_video_codec(self, codec: impl Into<String>) -> Self {
        self.with(VideoCodec(codec.into()))
    }

    /// `-c:a <codec>`.
    pub fn with_audio_codec(self, codec: impl Into<String>) -> Self {
        self.with(AudioCodec(codec.into()))
    }

    /// Scale filter; `None` keeps the aspect ratio for that side.
    pub fn scale(self, width: Option<u32>, height: Option<u32>) -> Self {
        self.with(Scale { width, height })
    }

    /// Raw video filter expression.
    pub fn with_video_filter(self, expression: impl Into<String>) -> Self {
        self.with(VideoFilter(expression.into()))
    }

    /// `-f <format>` on the output.
    pub fn force_format(self, format: impl Into<String>) -> Self {
        self.with(ForceFormat(format.into()))
    }

    /// `-pix_fmt <format>` on the output.
    pub fn with_pixel_format(self, format: impl Into<String>) -> Self {
        self.with(PixelFormat(format.into()))
    }

    /// `-t <duration>`.
    pub fn with_duration(self, duration: Duration) -> Self {
        self.with(DurationLimit(duration))
    }

    /// `-ss <position>` on the input.
    pub fn seek(self, position: Duration) -> Self {
        self.with(Seek(position))
    }

    /// `-r <fps>` on the output.
    pub fn with_frame_rate(self, fps: Fps) -> Self {
        self.with(FrameRate(fps))
    }

    /// `-c[:x] copy`.
    pub fn copy_channel(self, channel: Channel) -> Self {
        self.with(StreamCopy(channel))
    }

    /// `-vn` / `-an` / `-sn`.
    pub fn disable_channel(self, channel: Channel) -> Self {
        self.with(DisableChannel(channel))
    }

    /// `-movflags <flags>`.
    pub fn with_movflags(self, flags: impl Into<String>) -> Self {
        self.with(MovFlags(flags.into()))
    }

    /// Verbatim post-input tokens.
    pub fn with_custom<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(CustomArgument::post_input(tokens))
    }

    /// Write to a file and hand the collection to a processor.
    pub fn output_to_file(mut self, path: impl Into<PathBuf>, overwrite: bool) -> FfmpegProcessor {
        self.output = Some(Output::File {
            path: path.into(),
            overwrite,
        });
        FfmpegProcessor::new(self)
    }

    /// Write to a pipe sink and hand the collection to a processor.
    pub fn output_to_pipe(mut self, sink: impl PipeSink + 'static) -> FfmpegProcessor {
        self.output = Some(Output::Pipe(Box::new(sink)));
        FfmpegProcessor::new(self)
    }

    /// Replace the output target without creating a processor.
    pub fn set_output(&mut self, output: Output) {
        self.output = Some(output);
    }

    /// First argument of type `T`, in declaration order.
    pub fn find<T: ArgumentKind>(&self) -> Option<&T> {
        self.arguments.iter().find_map(T::extract)
    }

    /// Every argument, in declaration order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Every input, in order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Output target, if set.
    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    /// Predict the output geometry for a source of `source` size from the first scale argument.
    pub fn predict_frame_size(&self, source: FrameSize) -> FrameSize {
        self.find::<Scale>()
            .map_or(source, |scale| scale.apply(source))
    }

    /// Check the collection can be rendered into a runnable command.
    pub fn validate(&self) -> FfResult<()> {
        if self.inputs.is_empty() {
            return Err(FfError::configuration("no input specified"));
        }
        let pipe_inputs = self
            .inputs
            .iter()
            .filter(|i| matches!(i, Input::Pipe(_)))
            .count();
        if pipe_inputs > 1 {
            return Err(FfError::configuration(format!(
                "{pipe_inputs} pipe inputs given, only one (stdin) is supported"
            )));
        }

        for arg in &self.arguments {
            if let Argument::Scale(scale) = arg {
                validate_scale(scale)?;
            }
        }

        match &self.output {
            None => Err(FfError::configuration("no output target specified")),
            Some(Output::File { .. }) => Ok(()),
            Some(Output::Pipe(sink)) => self.validate_pipe_output(sink.as_ref()),
        }
    }

    fn validate_pipe_output(&self, sink: &dyn PipeSink) -> FfResult<()> {
        let format = sink
            .format()
            .or_else(|| self.output_format())
            .ok_or_else(|| {
                FfError::configuration(
                    "output pipe requires a forced output format (-f); it cannot be inferred from pipe:1",
                )
            })?;
        let format = format.to_ascii_lowercase();
        if SEEKABLE_ONLY_FORMATS.contains(&format.as_str()) && !self.has_fragmented_movflags() {
            return Err(FfError::configuration(format!(
                "format '{format}' needs a seekable output and cannot be streamed to a pipe \
                 (add -movflags +frag_keyframe+empty_moov)"
            )));
        }
        Ok(())
    }

    /// Output container the engine will use: the last post-input `-f`, typed or custom.
    fn output_format(&self) -> Option<&str> {
        self.arguments
            .iter()
            .filter(|arg| arg.placement() == Placement::PostInput)
            .filter_map(|arg| match arg {
                Argument::ForceFormat(f) => Some(f.0.as_str()),
                Argument::Custom(c) => c
                    .tokens
                    .windows(2)
                    .rev()
                    .find(|w| w[0] == "-f")
                    .map(|w| w[1].as_str()),
                _ => None,
            })
            .last()
    }

    fn has_fragmented_movflags(&self) -> bool {
        let fragmented = |flags: &str| flags.contains("frag_keyframe") || flags.contains("empty_moov");
        self.arguments.iter().any(|arg| match arg {
            Argument::MovFlags(m) => fragmented(&m.0),
            Argument::Custom(c) => c
                .tokens
                .windows(2)
                .any(|w| w[0] == "-movflags" && fragmented(&w[1])),
            _ => false,
        })
    }

    pub(crate) fn pipe_endpoints(
        &mut self,
    ) -> (Option<&mut dyn PipeSource>, Option<&mut dyn PipeSink>) {
        let source = self.inputs.iter_mut().find_map(|input| match input {
            Input::Pipe(source) => Some(source.as_mut() as &mut dyn PipeSource),
            Input::File(_) => None,
        });
        let sink = match self.output.as_mut() {
            Some(Output::Pipe(sink)) => Some(sink.as_mut() as &mut dyn PipeSink),
            _ => None,
        };
        (source, sink)
    }
}

fn validate_scale(scale: &Scale) -> FfResult<()> {
    match (scale.width, scale.height) {
        (None, None) => Err(FfError::configuration(
            "scale needs at least one explicit side",
        )),
        (Some(0), _) | (_, Some(0)) => Err(FfError::configuration(format!(
            "scale sides must be non-zero, got {}",
            scale.expression()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/args/collection.rs"]
mod tests;
