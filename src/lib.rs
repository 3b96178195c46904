//! ffweave drives the system `ffmpeg` binary as a subprocess.
//!
//! A run is described by an [`Arguments`] collection (inputs, typed arguments, one output
//! target), rendered into an ordered [`CommandLine`] and executed by an [`FfmpegProcessor`].
//! Inputs and outputs can be files or in-process streams: a [`PipeSource`] feeds the engine's
//! stdin and a [`PipeSink`] receives its stdout, each pumped on its own thread so large
//! transcodes never deadlock on full OS pipe buffers.
//!
//! # Run lifecycle
//!
//! 1. **Validate & render**: configuration problems are reported as [`FfError::Configuration`]
//!    before anything is spawned.
//! 2. **Spawn**: a missing or unexecutable binary is [`FfError::Spawn`].
//! 3. **Pump & monitor**: source pump, sink pump and a diagnostic reader run concurrently; the
//!    diagnostic reader turns `time=` stats into [`ProgressEvent`]s for registered observers.
//! 4. **Resolve**: the exit code and pump faults are classified into a [`RunResult`].
//!    Cancellation (through a [`CancelToken`]) resolves with `cancelled = true`, never as an error.
//!
//! [`FfmpegProcessor::run`] blocks the calling thread; [`FfmpegProcessor::run_async`] runs the
//! same engine on tokio's blocking pool and returns a cancellable [`RunHandle`].
//!
//! ```no_run
//! use ffweave::{Arguments, SharedBuffer, StreamPipeSink};
//!
//! # fn main() -> ffweave::FfResult<()> {
//! let out = SharedBuffer::new();
//! let result = Arguments::from_file("input.mkv")
//!     .scale(Some(640), None)
//!     .with_video_codec("mpeg4")
//!     .force_format("matroska")
//!     .output_to_pipe(StreamPipeSink::new(out.clone()))
//!     .run_checked()?;
//! assert!(result.success);
//! println!("{} bytes", out.len());
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod args;
mod foundation;
mod pipes;
mod probe;
mod process;
mod progress;

pub use crate::args::argument::{
    Argument, ArgumentKind, AudioCodec, BitStreamFilter, Channel, CustomArgument, DisableChannel,
    DurationLimit, ForceFormat, FrameRate, MovFlags, PixelFormat, Placement, Scale, Seek,
    StreamCopy, Threads, VideoCodec, VideoFilter,
};
pub use crate::args::collection::{Arguments, Input, Output};
pub use crate::args::command::{CommandLine, STDIN_PIPE, STDOUT_PIPE};
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::config::{BINARY_FOLDER_ENV, EngineConfig};
pub use crate::foundation::core::{Fps, FrameSize, format_timestamp, parse_timestamp};
pub use crate::foundation::error::{FfError, FfResult};
pub use crate::pipes::frame::{RawFrame, RawVideoPipeSource, VideoFrame};
pub use crate::pipes::pump::{DEFAULT_CHUNK_SIZE, copy_chunked};
pub use crate::pipes::sink::{PipeSink, SharedBuffer, StreamPipeSink};
pub use crate::pipes::source::{PipeSource, StreamPipeSource};
pub use crate::probe::analysis::{MediaAnalysis, StreamInfo, StreamKind};
pub use crate::probe::{probe_bytes, probe_file};
pub use crate::process::handle::RunHandle;
pub use crate::process::outcome::{
    PumpEndpoint, PumpFault, RunFailure, RunResult, RunStats, Verdict, classify,
};
pub use crate::process::processor::FfmpegProcessor;
pub use crate::progress::monitor::ProgressMonitor;
pub use crate::progress::parser::{ProgressEvent, fraction, parse_elapsed};
