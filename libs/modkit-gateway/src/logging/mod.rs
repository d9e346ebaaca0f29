//! Communication logging
//!
//! A [`GatewayLogger`] receives every request together with its response or
//! its failure. [`DefaultGatewayLogger`] turns both into a structured
//! [`LogRecord`] and hands it to a [`LogSink`].

mod default_logger;
mod sink;
mod trimming;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::request::GatewayRequest;
use crate::response::EndpointResponse;

pub use default_logger::DefaultGatewayLogger;
pub use sink::{COMMUNICATION_TARGET, RecordingLogSink, TracingLogSink};
pub use trimming::{ResponseBodyTrimmingDecorator, TRIMMED_BODY_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

/// One structured log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub context: serde_json::Value,
}

/// Destination for [`LogRecord`]s
pub trait LogSink: Send + Sync {
    fn log(&self, record: LogRecord);
}

pub trait GatewayLogger: Send + Sync {
    fn log_request_response_pair(
        &self,
        request: &dyn GatewayRequest,
        response: &EndpointResponse,
        start: Instant,
        stop: Instant,
        level: LogLevel,
    );

    fn log_request_exception(
        &self,
        request: &dyn GatewayRequest,
        error: &(dyn std::error::Error + 'static),
        start: Instant,
        stop: Instant,
        level: LogLevel,
    );
}

impl<T: GatewayLogger + ?Sized> GatewayLogger for Arc<T> {
    fn log_request_response_pair(
        &self,
        request: &dyn GatewayRequest,
        response: &EndpointResponse,
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        (**self).log_request_response_pair(request, response, start, stop, level);
    }

    fn log_request_exception(
        &self,
        request: &dyn GatewayRequest,
        error: &(dyn std::error::Error + 'static),
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        (**self).log_request_exception(request, error, start, stop, level);
    }
}

/// Whole microseconds from `start` to `stop`, `0` if `stop` is earlier
#[must_use]
pub fn elapsed_micros(start: Instant, stop: Instant) -> u64 {
    u64::try_from(stop.saturating_duration_since(start).as_micros()).unwrap_or(u64::MAX)
}
