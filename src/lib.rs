//! Process-wide named logging facade.
//!
//! [`get_logger`] vends uniquely named handles that render records in a fixed
//! line format and write them to standard error. [`init_loggers`] optionally
//! attaches a syslog sink and a CloudWatch Logs sink to every handle the
//! registry has vended so far.

mod aws;
mod bridge;
mod formatters;
mod logger;
mod record;
mod registry;
mod sinks;
mod writer;

pub use bridge::install_log_bridge;
pub use formatters::HandleFormatter;
pub use logger::LogHandle;
pub use record::{Fields, Level, Record};
pub use registry::{fuse_logger, get_logger, init_loggers, main_logger};
pub use sinks::{CloudWatchSink, SyslogSink};
pub use writer::LineWriter;

pub trait LogFormatter: Sync + Send {
    fn format(&self, record: &Record) -> String;
}

pub trait LogSink: Sync + Send {
    /// Severities this sink wants to see.
    fn levels(&self) -> &[Level];
    fn write_log(&self, record: &Record, line: &str) -> eyre::Result<()>;
    fn flush(&self);
}
