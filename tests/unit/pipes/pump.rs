use super::*;
use std::io::Cursor;

/// Reader yielding `Interrupted` once before every real read.
struct Flaky {
    inner: Cursor<Vec<u8>>,
    interrupt_next: bool,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.inner.read(buf)
    }
}

#[test]
fn copies_everything_in_chunks() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let mut out = Vec::new();
    let n = copy_chunked(
        &mut Cursor::new(data.clone()),
        &mut out,
        7,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(n, data.len() as u64);
    assert_eq!(out, data);
}

#[test]
fn interrupted_reads_are_retried() {
    let mut reader = Flaky {
        inner: Cursor::new(b"hello world".to_vec()),
        interrupt_next: false,
    };
    let mut out = Vec::new();
    copy_chunked(&mut reader, &mut out, 4, &CancelToken::new()).unwrap();
    assert_eq!(out, b"hello world");
}

#[test]
fn cancelled_token_stops_before_copying() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut out = Vec::new();
    let n = copy_chunked(&mut Cursor::new(vec![1u8; 64]), &mut out, 8, &cancel).unwrap();
    assert_eq!(n, 0);
    assert!(out.is_empty());
}

#[test]
fn write_errors_propagate() {
    struct Closed;
    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
    let err = copy_chunked(
        &mut Cursor::new(vec![0u8; 16]),
        &mut Closed,
        8,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn counting_adapters_track_bytes() {
    let counter = AtomicU64::new(0);
    let mut sink = Vec::new();
    let mut w = CountingWriter::new(&mut sink, &counter);
    w.write_all(b"abcdef").unwrap();
    assert_eq!(counter.load(Ordering::Relaxed), 6);

    let read_counter = AtomicU64::new(0);
    let mut src = Cursor::new(vec![9u8; 5]);
    let mut r = CountingReader::new(&mut src, &read_counter);
    let mut buf = Vec::new();
    r.read_to_end(&mut buf).unwrap();
    assert_eq!(read_counter.load(Ordering::Relaxed), 5);
}
