use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value, json};

use super::{GatewayLogger, LogLevel, LogRecord, LogSink, TracingLogSink, elapsed_micros};
use crate::headers::header_map_to_json;
use crate::request::GatewayRequest;
use crate::response::EndpointResponse;

/// Writes censored request data, the response (or failure) and the elapsed
/// time as one record
///
/// Record message is `"{METHOD}: {censored uri}"`. Context layout:
///
/// ```text
/// request.headers, request.body (when present)
/// response.http_code, response.headers, response.body
/// elapsed_time_us
/// ```
///
/// On the failure path `response` only carries `body`, set to the error
/// message.
#[derive(Clone)]
pub struct DefaultGatewayLogger {
    sink: Arc<dyn LogSink>,
}

impl DefaultGatewayLogger {
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Logger writing to [`TracingLogSink`]
    #[must_use]
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingLogSink))
    }

    fn emit(
        &self,
        request: &dyn GatewayRequest,
        response: Value,
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        let message = format!("{}: {}", request.method(), request.censored_uri());
        let context = json!({
            "request": request_context(request),
            "response": response,
            "elapsed_time_us": elapsed_micros(start, stop),
        });
        self.sink.log(LogRecord {
            level,
            message,
            context,
        });
    }
}

impl Default for DefaultGatewayLogger {
    fn default() -> Self {
        Self::tracing()
    }
}

fn request_context(request: &dyn GatewayRequest) -> Value {
    let mut context = Map::new();
    context.insert(
        "headers".to_owned(),
        header_map_to_json(&request.censored_headers()),
    );
    if let Some(body) = request.censored_body() {
        context.insert("body".to_owned(), Value::String(body.to_text().into_owned()));
    }
    Value::Object(context)
}

impl GatewayLogger for DefaultGatewayLogger {
    fn log_request_response_pair(
        &self,
        request: &dyn GatewayRequest,
        response: &EndpointResponse,
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        let response = json!({
            "http_code": response.status().to_string(),
            "headers": header_map_to_json(response.headers()),
            "body": response.body().to_text(),
        });
        self.emit(request, response, start, stop, level);
    }

    fn log_request_exception(
        &self,
        request: &dyn GatewayRequest,
        error: &(dyn std::error::Error + 'static),
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        let response = json!({ "body": error.to_string() });
        self.emit(request, response, start, stop, level);
    }
}
