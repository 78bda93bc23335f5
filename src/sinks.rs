use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_smithy_types::error::display::DisplayErrorContext;
use eyre::Context;
use syslog::{Facility, Formatter3164, LoggerBackend};

use crate::aws::LogClientBuilder;
use crate::record::{Level, Record};
use crate::LogSink;

/// Sinks attached to one handle, bucketed by the severities each sink
/// accepts. Buckets keep attachment order; attaching the same sink twice is
/// a no-op.
pub(crate) struct SinkSet {
    by_level: HashMap<Level, Vec<Arc<dyn LogSink>>>,
}

impl SinkSet {
    pub(crate) fn new() -> Self {
        Self {
            by_level: HashMap::new(),
        }
    }

    pub(crate) fn add(&mut self, sink: Arc<dyn LogSink>) {
        for level in sink.levels() {
            let bucket = self.by_level.entry(*level).or_default();
            if bucket.iter().any(|existing| Arc::ptr_eq(existing, &sink)) {
                continue;
            }
            bucket.push(sink.clone());
        }
    }

    // A sink that errors must not keep the remaining sinks from seeing the
    // record, so every delivery result is dropped here.
    pub(crate) fn fire(&self, record: &Record, line: &str) {
        if let Some(bucket) = self.by_level.get(&record.level) {
            for sink in bucket {
                let _ = sink.write_log(record, line);
            }
        }
    }

    pub(crate) fn flush(&self) {
        for bucket in self.by_level.values() {
            for sink in bucket {
                sink.flush();
            }
        }
    }
}

/// Delivers records to the local syslog daemon over the platform socket.
pub struct SyslogSink {
    logger: Mutex<syslog::Logger<LoggerBackend, Formatter3164>>,
}

impl SyslogSink {
    pub fn connect() -> eyre::Result<Self> {
        let process = std::env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_default();

        let formatter = Formatter3164 {
            facility: Facility::LOG_USER,
            hostname: None,
            process,
            pid: std::process::id(),
        };

        let logger = syslog::unix(formatter)
            .map_err(|err| eyre::eyre!("Failed opening syslog socket: {}", err))?;

        Ok(Self {
            logger: Mutex::new(logger),
        })
    }
}

impl LogSink for SyslogSink {
    fn levels(&self) -> &[Level] {
        &Level::ALL
    }

    fn write_log(&self, record: &Record, line: &str) -> eyre::Result<()> {
        let message = line.trim_end_matches('\n');
        let mut logger = self.logger.lock().unwrap_or_else(|e| e.into_inner());

        let result = match record.level {
            Level::Panic | Level::Fatal => logger.crit(message),
            Level::Error => logger.err(message),
            Level::Warn => logger.warning(message),
            Level::Info => logger.info(message),
            Level::Debug | Level::Trace => logger.debug(message),
        };

        result.map_err(|err| eyre::eyre!("Failed writing to syslog: {}", err))
    }

    fn flush(&self) {}
}

/// Delivers records to a CloudWatch Logs stream, one `PutLogEvents` call per
/// record. Delivery blocks the emitting thread; there is no queueing.
pub struct CloudWatchSink {
    client: aws_sdk_cloudwatchlogs::Client,
    group: String,
    stream: String,
    runtime: tokio::runtime::Runtime,
}

impl CloudWatchSink {
    pub fn new(region: &str, group: &str, stream: &str) -> eyre::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed starting runtime for cloudwatch delivery")?;

        let client = runtime.block_on(
            LogClientBuilder::new()
                .use_region(Some(region.to_string()))
                .build(),
        )?;

        runtime.block_on(Self::ensure_stream(&client, group, stream))?;

        Ok(Self {
            client,
            group: group.to_string(),
            stream: stream.to_string(),
            runtime,
        })
    }

    async fn ensure_stream(
        client: &aws_sdk_cloudwatchlogs::Client,
        group: &str,
        stream: &str,
    ) -> eyre::Result<()> {
        if let Err(err) = client.create_log_group().log_group_name(group).send().await {
            let already_exists = err
                .as_service_error()
                .is_some_and(|err| err.is_resource_already_exists_exception());
            if !already_exists {
                return Err(eyre::eyre!(
                    "Failed creating log group {}: {}",
                    group,
                    DisplayErrorContext(&err)
                ));
            }
        }

        if let Err(err) = client
            .create_log_stream()
            .log_group_name(group)
            .log_stream_name(stream)
            .send()
            .await
        {
            let already_exists = err
                .as_service_error()
                .is_some_and(|err| err.is_resource_already_exists_exception());
            if !already_exists {
                return Err(eyre::eyre!(
                    "Failed creating log stream {}: {}",
                    stream,
                    DisplayErrorContext(&err)
                ));
            }
        }

        Ok(())
    }
}

impl LogSink for CloudWatchSink {
    fn levels(&self) -> &[Level] {
        &Level::ALL
    }

    fn write_log(&self, record: &Record, line: &str) -> eyre::Result<()> {
        let event = InputLogEvent::builder()
            .timestamp(record.time.timestamp_millis())
            .message(line.trim_end_matches('\n'))
            .build()?;

        self.runtime
            .block_on(
                self.client
                    .put_log_events()
                    .log_group_name(&self.group)
                    .log_stream_name(&self.stream)
                    .log_events(event)
                    .send(),
            )
            .map_err(|err| {
                eyre::eyre!(
                    "Failed delivering log event to cloudwatch: {}",
                    DisplayErrorContext(&err)
                )
            })?;

        Ok(())
    }

    fn flush(&self) {}
}
