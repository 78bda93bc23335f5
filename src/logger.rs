use std::fmt::Display;
use std::io::Write;
use std::sync::{Arc, Mutex, RwLock};

use crate::formatters::HandleFormatter;
use crate::record::{Fields, Level, Record};
use crate::registry;
use crate::sinks::SinkSet;
use crate::writer::LineWriter;
use crate::{LogFormatter, LogSink};

/// A named logger. Handles are vended by [`crate::get_logger`] and shared;
/// every operation takes `&self` and none of them can fail: write errors to
/// the output and sink delivery errors are swallowed.
pub struct LogHandle {
    name: String,
    formatter: HandleFormatter,
    threshold: RwLock<Level>,
    output: Mutex<Box<dyn Write + Send>>,
    sinks: Mutex<SinkSet>,
}

impl LogHandle {
    pub(crate) fn new(name: &str) -> Self {
        let handle = LogHandle {
            name: name.to_string(),
            formatter: HandleFormatter::new(name),
            threshold: RwLock::new(Level::Info),
            output: Mutex::new(Box::new(std::io::stderr())),
            sinks: Mutex::new(SinkSet::new()),
        };

        // Handles born after init_loggers still pick up the system sink.
        if let Some(sink) = registry::system_sink() {
            handle.add_sink(sink);
        }

        handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        *self.threshold.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_level(&self, level: Level) {
        *self.threshold.write().unwrap_or_else(|e| e.into_inner()) = level;
    }

    /// Replaces the output destination. The default is standard error.
    pub fn set_output(&self, output: Box<dyn Write + Send>) {
        *self.output.lock().unwrap_or_else(|e| e.into_inner()) = output;
    }

    /// Attaches a sink; attaching the same sink again is a no-op. Sinks are
    /// invoked in attachment order and are never removed.
    pub fn add_sink(&self, sink: Arc<dyn LogSink>) {
        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .add(sink);
    }

    pub fn flush(&self) {
        let _ = self
            .output
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .flush();
        self.sinks.lock().unwrap_or_else(|e| e.into_inner()).flush();
    }

    pub fn log(&self, level: Level, message: impl Display) {
        self.emit(level, message.to_string(), Fields::new());
    }

    pub fn log_with(&self, level: Level, message: impl Display, fields: Fields) {
        self.emit(level, message.to_string(), fields);
    }

    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn fatal(&self, message: impl Display) {
        self.log(Level::Fatal, message);
    }

    pub fn panic(&self, message: impl Display) {
        self.log(Level::Panic, message);
    }

    /// Adapts this handle as an `io::Write` that logs one record per line at
    /// `level`, for libraries that only know how to write free-form lines.
    ///
    /// Adapting re-levels the handle: its threshold drops to `level` and the
    /// formatter labels every subsequent line with `level`, including records
    /// emitted natively on this handle afterwards. That stickiness is
    /// intentional.
    pub fn line_writer(self: &Arc<Self>, level: Level) -> LineWriter {
        self.formatter.set_override(Some(level));
        self.set_level(level);
        LineWriter::new(self.clone(), level)
    }

    fn emit(&self, level: Level, message: String, fields: Fields) {
        if level < self.level() {
            return;
        }

        let record = Record::new(level, message).with_fields(fields);
        let line = self.formatter.format(&record);

        {
            let mut output = self.output.lock().unwrap_or_else(|e| e.into_inner());
            let _ = output.write_all(line.as_bytes());
            let _ = output.flush();
        }

        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fire(&record, &line);
    }
}
