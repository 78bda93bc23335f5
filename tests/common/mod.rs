use std::io::Write;
use std::sync::{Arc, Mutex};

/// Cloneable in-memory output, installed with `LogHandle::set_output` so
/// tests can read back what a logger wrote.
#[derive(Clone, Default)]
pub struct CaptureBuf(Arc<Mutex<Vec<u8>>>);

impl CaptureBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns everything captured so far.
    pub fn take(&self) -> String {
        let mut buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&std::mem::take(&mut *buf)).into_owned()
    }
}

impl Write for CaptureBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
