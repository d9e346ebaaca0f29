use std::time::Instant;

use super::{GatewayLogger, LogLevel};
use crate::body::MessageBody;
use crate::request::GatewayRequest;
use crate::response::EndpointResponse;

/// Body written to the log in place of the real response body
pub const TRIMMED_BODY_PLACEHOLDER: &str = "Body was trimmed by ServiceLayer library";

/// Logs responses with their body replaced by [`TRIMMED_BODY_PLACEHOLDER`]
///
/// Only the logged copy changes; the caller still receives the full body.
/// Failures are delegated unchanged.
pub struct ResponseBodyTrimmingDecorator<L> {
    inner: L,
}

impl<L: GatewayLogger> ResponseBodyTrimmingDecorator<L> {
    #[must_use]
    pub const fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<L: GatewayLogger> GatewayLogger for ResponseBodyTrimmingDecorator<L> {
    fn log_request_response_pair(
        &self,
        request: &dyn GatewayRequest,
        response: &EndpointResponse,
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        let trimmed = response.with_body(MessageBody::from(TRIMMED_BODY_PLACEHOLDER));
        self.inner
            .log_request_response_pair(request, &trimmed, start, stop, level);
    }

    fn log_request_exception(
        &self,
        request: &dyn GatewayRequest,
        error: &(dyn std::error::Error + 'static),
        start: Instant,
        stop: Instant,
        level: LogLevel,
    ) {
        self.inner
            .log_request_exception(request, error, start, stop, level);
    }
}
