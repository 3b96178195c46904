use std::io::{self, Read, Write};

use crate::foundation::cancel::CancelToken;
use crate::pipes::pump::{DEFAULT_CHUNK_SIZE, copy_chunked};

/// Caller-owned input stream standing in for an input file (`pipe:0`).
///
/// The orchestrator calls [`write_to`](PipeSource::write_to) on a pump thread with the engine's
/// stdin and closes stdin once it returns, so the engine observes end-of-input.
pub trait PipeSource: Send {
    /// Input-format tokens placed right before this input's `-i pipe:0`.
    fn stream_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Pump the owned stream into `stdin` until exhausted or `cancel` fires.
    ///
    /// `cancel` is only observable between reads. A run does not resolve until this returns,
    /// so a reader that blocks (a terminal, a socket without a timeout) delays the result of a
    /// cancelled or finished run until its next read completes, even though the engine has
    /// already exited. The following write then fails with a broken pipe and the pump ends.
    fn write_to(&mut self, stdin: &mut dyn Write, cancel: &CancelToken) -> io::Result<()>;
}

/// [`PipeSource`] over any [`Read`] implementation.
#[derive(Debug)]
pub struct StreamPipeSource<R> {
    reader: R,
    format: Option<String>,
    chunk_size: usize,
}

impl<R: Read + Send> StreamPipeSource<R> {
    /// Wrap `reader`; the engine probes the input format itself.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            format: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Declare the input format (`-f <format>` before `-i`).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Override the pump chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl<R: Read + Send> PipeSource for StreamPipeSource<R> {
    fn stream_args(&self) -> Vec<String> {
        match &self.format {
            Some(f) => vec!["-f".to_string(), f.clone()],
            None => Vec::new(),
        }
    }

    fn write_to(&mut self, stdin: &mut dyn Write, cancel: &CancelToken) -> io::Result<()> {
        copy_chunked(&mut self.reader, stdin, self.chunk_size, cancel).map(|_| ())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipes/source.rs"]
mod tests;
