use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::adapter::Adapter;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, BoxError, GatewayError};
use crate::logging::{GatewayLogger, LogLevel};
use crate::mapper::ResponseMapper;
use crate::request::GatewayRequest;
use crate::response::{DomainResponse, ErrorResponse, SimpleResponse};

/// Per-call options for [`RequestGateway::send_request`]
///
/// `adapter` and `logger` take precedence over one-time overrides set with
/// [`RequestGateway::via_adapter`] / [`RequestGateway::use_logger`].
#[derive(Default, Clone)]
pub struct SendOptions<'a> {
    pub mapper: Option<&'a dyn ResponseMapper>,
    pub config_override: Option<&'a AdapterConfig>,
    pub adapter: Option<Arc<dyn Adapter>>,
    pub logger: Option<Arc<dyn GatewayLogger>>,
}

impl<'a> SendOptions<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: &'a dyn ResponseMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    #[must_use]
    pub fn with_config_override(mut self, config: &'a AdapterConfig) -> Self {
        self.config_override = Some(config);
        self
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn GatewayLogger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// Use `adapter` for the next [`send_request`](Self::send_request) only
    fn via_adapter(&self, adapter: Arc<dyn Adapter>);

    /// Use `logger` for the next [`send_request`](Self::send_request) only
    fn use_logger(&self, logger: Arc<dyn GatewayLogger>);

    /// Drop pending one-time overrides without sending
    fn reset_one_time_overrides(&self);

    /// Send `request` and produce a domain response
    ///
    /// Error statuses and recognized failures come back as `Ok`; see
    /// [`DomainResponse::is_successful`].
    ///
    /// # Errors
    /// Returns [`GatewayError::Unhandled`] for failures the gateway does not
    /// recognize. They are logged before being returned.
    async fn send_request(
        &self,
        request: &dyn GatewayRequest,
        options: SendOptions<'_>,
    ) -> Result<DomainResponse, GatewayError>;
}

#[derive(Default)]
struct OneTimeOverrides {
    adapter: Option<Arc<dyn Adapter>>,
    logger: Option<Arc<dyn GatewayLogger>>,
}

/// Default [`RequestGateway`]: adapter call, communication log, mapping
pub struct Gateway {
    adapter: Arc<dyn Adapter>,
    logger: Arc<dyn GatewayLogger>,
    one_time: Mutex<OneTimeOverrides>,
}

impl Gateway {
    #[must_use]
    pub fn new(adapter: Arc<dyn Adapter>, logger: Arc<dyn GatewayLogger>) -> Self {
        Self {
            adapter,
            logger,
            one_time: Mutex::new(OneTimeOverrides::default()),
        }
    }

    /// Take pending one-time overrides, leaving none behind
    fn take_one_time_overrides(&self) -> OneTimeOverrides {
        std::mem::take(&mut *self.one_time.lock())
    }

    fn fail(
        logger: &dyn GatewayLogger,
        request: &dyn GatewayRequest,
        start: Instant,
        error: &(dyn std::error::Error + 'static),
        recognized: bool,
    ) -> Option<DomainResponse> {
        logger.log_request_exception(request, error, start, Instant::now(), LogLevel::Critical);
        if recognized {
            Some(ErrorResponse::from_error(error).into())
        } else {
            tracing::error!(error = %error, "Unrecognized failure while sending request");
            None
        }
    }
}

#[async_trait]
impl RequestGateway for Gateway {
    fn via_adapter(&self, adapter: Arc<dyn Adapter>) {
        self.one_time.lock().adapter = Some(adapter);
    }

    fn use_logger(&self, logger: Arc<dyn GatewayLogger>) {
        self.one_time.lock().logger = Some(logger);
    }

    fn reset_one_time_overrides(&self) {
        drop(self.take_one_time_overrides());
    }

    async fn send_request(
        &self,
        request: &dyn GatewayRequest,
        options: SendOptions<'_>,
    ) -> Result<DomainResponse, GatewayError> {
        let start = Instant::now();

        let one_time = self.take_one_time_overrides();
        let adapter = options
            .adapter
            .or(one_time.adapter)
            .unwrap_or_else(|| Arc::clone(&self.adapter));
        let logger = options
            .logger
            .or(one_time.logger)
            .unwrap_or_else(|| Arc::clone(&self.logger));

        let outbound = request.to_outbound();
        let response = match adapter.send(&outbound, options.config_override).await {
            Ok(response) => response,
            Err(err) => {
                let recognized = err.is_recognized();
                return Self::fail(logger.as_ref(), request, start, &err, recognized)
                    .ok_or_else(|| GatewayError::Unhandled(unhandled(err)));
            }
        };

        let level = if response.is_successful() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        logger.log_request_response_pair(request, &response, start, Instant::now(), level);

        let Some(mapper) = options.mapper else {
            return Ok(SimpleResponse::from_endpoint_response(&response).into());
        };
        match mapper.map_to_domain(&response) {
            Ok(domain) => Ok(domain),
            Err(err) => {
                let recognized = err.is_recognized();
                Self::fail(logger.as_ref(), request, start, &err, recognized)
                    .ok_or_else(|| GatewayError::Unhandled(Box::new(err)))
            }
        }
    }
}

/// Unwrap `Unexpected` so callers see the original error
fn unhandled(err: AdapterError) -> BoxError {
    match err {
        AdapterError::Unexpected(source) => source,
        other => Box::new(other),
    }
}
