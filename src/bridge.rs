use std::sync::Arc;

use eyre::Context;

use crate::logger::LogHandle;
use crate::record::Level;

/// Forwards `log` crate records to one registry handle.
struct LogBridge {
    handle: Arc<LogHandle>,
}

fn convert(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Trace,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        convert(metadata.level()) >= self.handle.level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.handle.log(convert(record.level()), record.args());
        }
    }

    fn flush(&self) {
        self.handle.flush();
    }
}

/// Installs `handle` as the global `log` crate backend, so libraries logging
/// through `log::info!` and friends end up on this handle. The handle's own
/// threshold decides what gets through. Fails if another backend is already
/// registered.
pub fn install_log_bridge(handle: Arc<LogHandle>) -> eyre::Result<()> {
    log::set_max_level(log::LevelFilter::Trace);
    log::set_boxed_logger(Box::new(LogBridge { handle }))
        .context("Failed registering boxed logger")?;
    Ok(())
}
