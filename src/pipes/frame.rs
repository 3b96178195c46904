use std::io::{self, Write};

use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{FfError, FfResult};
use crate::pipes::source::PipeSource;

/// One uncompressed video frame.
pub trait VideoFrame {
    /// Frame geometry.
    fn size(&self) -> FrameSize;
    /// ffmpeg pixel-format name of [`data`](VideoFrame::data) (`rgb24`, `rgba`, ...).
    fn pixel_format(&self) -> &str;
    /// Packed pixel bytes.
    fn data(&self) -> &[u8];
}

/// Owned frame with an arbitrary pixel format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Frame geometry.
    pub size: FrameSize,
    /// ffmpeg pixel-format name.
    pub pixel_format: String,
    /// Packed pixel bytes.
    pub data: Vec<u8>,
}

impl VideoFrame for RawFrame {
    fn size(&self) -> FrameSize {
        self.size
    }

    fn pixel_format(&self) -> &str {
        &self.pixel_format
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

impl VideoFrame for image::RgbImage {
    fn size(&self) -> FrameSize {
        FrameSize::new(self.width(), self.height())
    }

    fn pixel_format(&self) -> &str {
        "rgb24"
    }

    fn data(&self) -> &[u8] {
        self.as_raw()
    }
}

impl VideoFrame for image::RgbaImage {
    fn size(&self) -> FrameSize {
        FrameSize::new(self.width(), self.height())
    }

    fn pixel_format(&self) -> &str {
        "rgba"
    }

    fn data(&self) -> &[u8] {
        self.as_raw()
    }
}

/// [`PipeSource`] streaming a sequence of raw frames as `-f rawvideo`.
///
/// Geometry and pixel format are taken from the first frame. Every later frame must match them;
/// a mismatch stops the pump with an `InvalidData` fault.
pub struct RawVideoPipeSource<I: Iterator> {
    first: Option<I::Item>,
    rest: I,
    size: FrameSize,
    pixel_format: String,
    fps: Fps,
    frames_written: u64,
}

impl<I> RawVideoPipeSource<I>
where
    I: Iterator + Send,
    I::Item: VideoFrame + Send,
{
    /// Peek the first frame of `frames` to declare the stream. An empty sequence is rejected.
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> FfResult<Self> {
        let mut rest = frames.into_iter();
        let first = rest
            .next()
            .ok_or_else(|| FfError::configuration("raw video source has no frames"))?;
        let size = first.size();
        if size.is_empty() {
            return Err(FfError::configuration(format!(
                "raw video frames must be non-empty, got {size}"
            )));
        }
        let pixel_format = first.pixel_format().to_string();
        Ok(Self {
            first: Some(first),
            rest,
            size,
            pixel_format,
            fps: Fps::default(),
            frames_written: 0,
        })
    }

    /// Input frame rate (default 25).
    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    /// Declared frame geometry.
    pub fn frame_size(&self) -> FrameSize {
        self.size
    }

    /// Declared pixel format.
    pub fn pixel_format(&self) -> &str {
        &self.pixel_format
    }

    /// Frames pumped so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn write_frame(&self, stdin: &mut dyn Write, frame: &I::Item) -> io::Result<()> {
        if frame.size() != self.size || frame.pixel_format() != self.pixel_format {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frame {} is {} {}, expected {} {}",
                    self.frames_written,
                    frame.size(),
                    frame.pixel_format(),
                    self.size,
                    self.pixel_format
                ),
            ));
        }
        stdin.write_all(frame.data())
    }
}

impl<I> PipeSource for RawVideoPipeSource<I>
where
    I: Iterator + Send,
    I::Item: VideoFrame + Send,
{
    fn stream_args(&self) -> Vec<String> {
        vec![
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-s".to_string(),
            self.size.to_string(),
            "-r".to_string(),
            self.fps.to_arg(),
        ]
    }

    fn write_to(&mut self, stdin: &mut dyn Write, cancel: &CancelToken) -> io::Result<()> {
        if let Some(first) = self.first.take() {
            if cancel.is_cancelled() {
                return Ok(());
            }
            self.write_frame(stdin, &first)?;
            self.frames_written += 1;
        }
        while !cancel.is_cancelled() {
            let Some(frame) = self.rest.next() else {
                break;
            };
            self.write_frame(stdin, &frame)?;
            self.frames_written += 1;
        }
        stdin.flush()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipes/frame.rs"]
mod tests;
