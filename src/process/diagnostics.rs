use std::collections::VecDeque;
use std::io::{self, Read};

/// Tail-bounded copy of the engine's diagnostic output.
#[derive(Debug)]
pub(crate) struct DiagnosticLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticLog {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, line: &str) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub(crate) fn tail(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Longest diagnostic line kept, in bytes; the rest of an overlong line is dropped.
pub(crate) const MAX_LINE_BYTES: usize = 4096;

/// Read `reader` to end-of-stream, calling `on_line` for every non-empty line.
///
/// Lines end at `\n` or `\r`: the engine redraws its stats line with bare carriage returns.
/// Lines longer than [`MAX_LINE_BYTES`] are truncated, so memory stays bounded whatever the
/// engine writes.
pub(crate) fn for_each_line(
    reader: &mut dyn Read,
    mut on_line: impl FnMut(&str),
) -> io::Result<()> {
    let mut buf = [0u8; 4096];
    let mut pending = Vec::with_capacity(256);
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        for &b in &buf[..n] {
            if b == b'\n' || b == b'\r' {
                flush_line(&mut pending, &mut on_line);
            } else if pending.len() < MAX_LINE_BYTES {
                pending.push(b);
            }
        }
    }
    flush_line(&mut pending, &mut on_line);
    Ok(())
}

fn flush_line(pending: &mut Vec<u8>, on_line: &mut impl FnMut(&str)) {
    if pending.is_empty() {
        return;
    }
    {
        let line = String::from_utf8_lossy(pending);
        let line = line.trim_end();
        if !line.is_empty() {
            on_line(line);
        }
    }
    pending.clear();
}

#[cfg(test)]
#[path = "../../tests/unit/process/diagnostics.rs"]
mod tests;
