use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::cancel::CancelToken;

/// Default pump chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Copy `reader` into `writer` in `chunk_size` pieces until end-of-stream or cancellation.
///
/// Returns the number of bytes copied. Cancellation stops the copy between chunks and is not an
/// error.
pub fn copy_chunked(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    chunk_size: usize,
    cancel: &CancelToken,
) -> io::Result<u64> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    while !cancel.is_cancelled() {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

/// `Write` adapter adding every written byte to a shared counter.
pub(crate) struct CountingWriter<'a, W: ?Sized> {
    inner: &'a mut W,
    count: &'a AtomicU64,
}

impl<'a, W: Write + ?Sized> CountingWriter<'a, W> {
    pub(crate) fn new(inner: &'a mut W, count: &'a AtomicU64) -> Self {
        Self { inner, count }
    }
}

impl<W: Write + ?Sized> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `Read` adapter adding every read byte to a shared counter.
pub(crate) struct CountingReader<'a, R: ?Sized> {
    inner: &'a mut R,
    count: &'a AtomicU64,
}

impl<'a, R: Read + ?Sized> CountingReader<'a, R> {
    pub(crate) fn new(inner: &'a mut R, count: &'a AtomicU64) -> Self {
        Self { inner, count }
    }
}

impl<R: Read + ?Sized> Read for CountingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipes/pump.rs"]
mod tests;
