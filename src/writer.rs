use std::io;
use std::io::Write;
use std::sync::Arc;

use crate::logger::LogHandle;
use crate::record::Level;

/// `io::Write` adapter over a [`LogHandle`], produced by
/// [`LogHandle::line_writer`]. Bytes are buffered until a newline, then each
/// complete line becomes one record at the adapter's level. Whatever is left
/// in the buffer is emitted on `flush` or drop.
pub struct LineWriter {
    handle: Arc<LogHandle>,
    level: Level,
    buf: Vec<u8>,
}

impl LineWriter {
    pub(crate) fn new(handle: Arc<LogHandle>, level: Level) -> Self {
        Self {
            handle,
            level,
            buf: Vec::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    fn emit(&self, line: &[u8]) {
        self.handle
            .log(self.level, String::from_utf8_lossy(line));
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop();
            if line.ends_with(b"\r") {
                line.pop();
            }
            self.emit(&line);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            self.emit(&line);
        }
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
