use std::sync::RwLock;

use crate::record::{Level, Record};
use crate::{registry, LogFormatter};

const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Renders one record as one line: `[timestamp ]name.LEVEL message[ fields]\n`.
/// The timestamp is dropped once a system sink is installed, since the system
/// logger stamps records itself.
pub struct HandleFormatter {
    name: String,
    level_override: RwLock<Option<Level>>,
}

impl HandleFormatter {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level_override: RwLock::new(None),
        }
    }

    pub(crate) fn set_override(&self, level: Option<Level>) {
        *self
            .level_override
            .write()
            .unwrap_or_else(|e| e.into_inner()) = level;
    }

    pub(crate) fn level_override(&self) -> Option<Level> {
        *self.level_override.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogFormatter for HandleFormatter {
    fn format(&self, record: &Record) -> String {
        let level = self.level_override().unwrap_or(record.level);

        let timestamp = if registry::system_sink_installed() {
            String::new()
        } else {
            format!("{} ", record.time.format(TIME_FORMAT))
        };

        let mut line = format!(
            "{}{}.{} {}",
            timestamp,
            self.name,
            level.as_str(),
            record.message
        );

        if !record.fields.is_empty() {
            line.push_str(&format!(" {}", record.fields));
        }

        line.push('\n');
        line
    }
}
