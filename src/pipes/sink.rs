use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::cancel::CancelToken;
use crate::pipes::pump::{DEFAULT_CHUNK_SIZE, copy_chunked};

/// Caller-owned output stream standing in for an output file (`pipe:1`).
pub trait PipeSink: Send {
    /// Output tokens placed right before `pipe:1`.
    fn stream_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Output container this sink forces, if any.
    fn format(&self) -> Option<&str> {
        None
    }

    /// Pump `stdout` into the owned stream until the engine closes it or `cancel` fires.
    fn read_from(&mut self, stdout: &mut dyn Read, cancel: &CancelToken) -> io::Result<()>;
}

/// [`PipeSink`] over any [`Write`] implementation.
#[derive(Debug)]
pub struct StreamPipeSink<W> {
    writer: W,
    format: Option<String>,
    chunk_size: usize,
}

impl<W: Write + Send> StreamPipeSink<W> {
    /// Wrap `writer`. The output format must then come from a `-f` argument.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            format: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Force the output container (`-f <format>` before `pipe:1`).
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

impl<W: Write + Send> PipeSink for StreamPipeSink<W> {
    fn stream_args(&self) -> Vec<String> {
        match &self.format {
            Some(f) => vec!["-f".to_string(), f.clone()],
            None => Vec::new(),
        }
    }

    fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    fn read_from(&mut self, stdout: &mut dyn Read, cancel: &CancelToken) -> io::Result<()> {
        copy_chunked(stdout, &mut self.writer, self.chunk_size, cancel).map(|_| ())
    }
}

/// Cloneable in-memory `Write` target.
///
/// Hand one clone to a [`StreamPipeSink`] and keep another to read the output after the run.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipes/sink.rs"]
mod tests;
