use parking_lot::Mutex;

use super::{LogLevel, LogRecord, LogSink};

/// `tracing` target of communication records
pub const COMMUNICATION_TARGET: &str = "modkit_gateway::communication";

/// Emits records as `tracing` events
///
/// `critical` has no `tracing` level of its own; it is emitted at `ERROR`
/// and told apart by the `severity` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, record: LogRecord) {
        let severity = record.level.as_str();
        let context = record.context.to_string();
        let message = record.message;
        match record.level {
            LogLevel::Debug => {
                tracing::debug!(target: COMMUNICATION_TARGET, severity, context = %context, "{message}");
            }
            LogLevel::Info => {
                tracing::info!(target: COMMUNICATION_TARGET, severity, context = %context, "{message}");
            }
            LogLevel::Warning => {
                tracing::warn!(target: COMMUNICATION_TARGET, severity, context = %context, "{message}");
            }
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(target: COMMUNICATION_TARGET, severity, context = %context, "{message}");
            }
        }
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for RecordingLogSink {
    fn log(&self, record: LogRecord) {
        self.records.lock().push(record);
    }
}
