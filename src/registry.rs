use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once, OnceLock};

use once_cell::sync::Lazy;

use crate::logger::LogHandle;
use crate::sinks::{CloudWatchSink, SyslogSink};
use crate::LogSink;

// Process-wide name -> handle map. "main" and "fuse" exist from the start so
// log calls made before init_loggers have somewhere to go.
static LOGGERS: Lazy<Mutex<HashMap<String, Arc<LogHandle>>>> = Lazy::new(|| {
    let mut loggers = HashMap::new();
    for name in ["main", "fuse"] {
        loggers.insert(name.to_string(), Arc::new(LogHandle::new(name)));
    }
    Mutex::new(loggers)
});

// Set at most once, under the LOGGERS mutex. Its presence doubles as the
// flag that makes the formatter drop its timestamp.
static SYSTEM_SINK: OnceLock<Arc<dyn LogSink>> = OnceLock::new();

static INIT: Once = Once::new();

/// Returns the logger registered under `name`, creating it on first use.
/// Every caller asking for the same name gets the same handle.
pub fn get_logger(name: &str) -> Arc<LogHandle> {
    let mut loggers = LOGGERS.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(handle) = loggers.get(name) {
        return handle.clone();
    }

    let handle = Arc::new(LogHandle::new(name));
    loggers.insert(name.to_string(), handle.clone());
    handle
}

pub fn main_logger() -> Arc<LogHandle> {
    get_logger("main")
}

pub fn fuse_logger() -> Arc<LogHandle> {
    get_logger("fuse")
}

/// One-shot global sink configuration; repeat calls are no-ops.
///
/// With `log_to_syslog`, connects to the local syslog daemon and attaches it
/// to every logger, present and future. With a non-empty region, group and
/// stream triple, builds a CloudWatch sink and attaches it to the loggers
/// registered at this moment; loggers created later do not get it. A sink
/// that cannot be built costs one warning on the `main` logger and nothing
/// else.
pub fn init_loggers(log_to_syslog: bool, region: &str, group: &str, stream: &str) {
    INIT.call_once(|| configure(log_to_syslog, region, group, stream));
}

fn configure(log_to_syslog: bool, region: &str, group: &str, stream: &str) {
    // Sink construction may open network or daemon connections, so it runs
    // before the registry lock is taken.
    let remote: Option<Arc<dyn LogSink>> =
        if !region.is_empty() && !group.is_empty() && !stream.is_empty() {
            match CloudWatchSink::new(region, group, stream) {
                Ok(sink) => Some(Arc::new(sink)),
                Err(err) => {
                    main_logger().warn(format!("Could not create cloudwatch log: {:#}", err));
                    None
                }
            }
        } else {
            None
        };

    let system: Option<Arc<dyn LogSink>> = if log_to_syslog {
        match SyslogSink::connect() {
            Ok(sink) => Some(Arc::new(sink)),
            Err(err) => {
                main_logger().warn(format!(
                    "Unable to connect to local syslog daemon: {:#}",
                    err
                ));
                None
            }
        }
    } else {
        None
    };

    attach_global_sinks(system, remote);
}

fn attach_global_sinks(system: Option<Arc<dyn LogSink>>, remote: Option<Arc<dyn LogSink>>) {
    if system.is_none() && remote.is_none() {
        return;
    }

    let loggers = LOGGERS.lock().unwrap_or_else(|e| e.into_inner());

    // Publishing the system sink under the registry mutex means a handle is
    // either in the map below or will see the sink inside LogHandle::new;
    // no handle can miss both.
    if let Some(sink) = &system {
        let _ = SYSTEM_SINK.set(sink.clone());
    }

    for handle in loggers.values() {
        if let Some(sink) = &remote {
            handle.add_sink(sink.clone());
        }
        if let Some(sink) = &system {
            handle.add_sink(sink.clone());
        }
    }
}

pub(crate) fn system_sink() -> Option<Arc<dyn LogSink>> {
    SYSTEM_SINK.get().cloned()
}

pub(crate) fn system_sink_installed() -> bool {
    SYSTEM_SINK.get().is_some()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;
    use crate::record::{Level, Record};

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }

        fn lines(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl LogSink for RecordingSink {
        fn levels(&self) -> &[Level] {
            &Level::ALL
        }

        fn write_log(&self, _record: &Record, line: &str) -> eyre::Result<()> {
            self.seen.lock().unwrap().push(line.to_string());
            Ok(())
        }

        fn flush(&self) {}
    }

    #[derive(Clone, Default)]
    struct CaptureBuf(Arc<Mutex<Vec<u8>>>);

    impl CaptureBuf {
        fn take(&self) -> String {
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

    #[test]
    fn same_name_returns_the_same_handle() {
        let first = get_logger("identity");
        let second = get_logger("identity");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &get_logger("identity2")));
    }

    #[test]
    fn reserved_loggers_exist_up_front() {
        assert_eq!(main_logger().name(), "main");
        assert_eq!(fuse_logger().name(), "fuse");
        assert!(Arc::ptr_eq(&main_logger(), &get_logger("main")));
    }

    // The system-sink slot is process-global and monotonic, so everything
    // that depends on it being set runs inside this one test; the tests
    // above never look at timestamps.
    #[test]
    fn global_sinks_attach_retroactively_and_relabel_output() {
        let before = get_logger("retro-before");
        before.set_output(Box::new(std::io::sink()));

        let system = Arc::new(RecordingSink::new());
        let remote = Arc::new(RecordingSink::new());
        attach_global_sinks(Some(system.clone()), Some(remote.clone()));

        // Retroactive attachment: a handle created before configuration
        // still reaches both sinks.
        before.info("early handle");
        assert_eq!(system.lines().len(), 1);
        assert_eq!(remote.lines().len(), 1);

        // With the system sink installed the line loses its timestamp.
        let buf = CaptureBuf::default();
        before.set_output(Box::new(buf.clone()));
        before.info("hi");
        assert_eq!(buf.take(), "retro-before.INFO hi\n");

        // A handle created afterwards inherits the system sink but not the
        // remote one.
        let after = get_logger("retro-after");
        after.set_output(Box::new(std::io::sink()));
        after.info("late handle");

        let system_lines = system.lines();
        assert!(system_lines
            .iter()
            .any(|line| line.contains("retro-after.INFO late handle")));
        assert!(remote
            .lines()
            .iter()
            .all(|line| !line.contains("retro-after")));
    }
}
