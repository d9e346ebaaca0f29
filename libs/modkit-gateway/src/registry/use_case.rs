use std::sync::Arc;

use crate::adapter::Adapter;
use crate::config::AdapterConfig;
use crate::error::RegistryError;
use crate::gateway::{RequestGateway, SendOptions};
use crate::logging::GatewayLogger;
use crate::mapper::ResponseMapper;
use crate::request::GatewayRequest;
use crate::response::DomainResponse;

const REQUEST_NOT_SET: &str = "Request to send was not set. Before invoking `perform_request` you have to set request first";

/// A request together with everything needed to send it
///
/// Overrides are passed to the gateway per call, so one use case never
/// changes how another one is sent through the same gateway.
#[derive(Clone)]
pub struct GatewayUseCase {
    default_gateway: Arc<dyn RequestGateway>,
    gateway_override: Option<Arc<dyn RequestGateway>>,
    request: Option<Arc<dyn GatewayRequest>>,
    mapper: Option<Arc<dyn ResponseMapper>>,
    config_override: Option<AdapterConfig>,
    adapter_override: Option<Arc<dyn Adapter>>,
    logger_override: Option<Arc<dyn GatewayLogger>>,
}

impl GatewayUseCase {
    #[must_use]
    pub fn new(default_gateway: Arc<dyn RequestGateway>) -> Self {
        Self {
            default_gateway,
            gateway_override: None,
            request: None,
            mapper: None,
            config_override: None,
            adapter_override: None,
            logger_override: None,
        }
    }

    #[must_use]
    pub fn set_request_to_send(mut self, request: Arc<dyn GatewayRequest>) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: Arc<dyn ResponseMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    #[must_use]
    pub fn with_config_override(mut self, config: AdapterConfig) -> Self {
        self.config_override = Some(config);
        self
    }

    #[must_use]
    pub fn via_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter_override = Some(adapter);
        self
    }

    #[must_use]
    pub fn use_logger(mut self, logger: Arc<dyn GatewayLogger>) -> Self {
        self.logger_override = Some(logger);
        self
    }

    #[must_use]
    pub fn through_gateway_override(mut self, gateway: Arc<dyn RequestGateway>) -> Self {
        self.gateway_override = Some(gateway);
        self
    }

    /// # Errors
    /// Returns [`RegistryError::BadState`] if no request was set and
    /// [`RegistryError::Gateway`] for failures the gateway does not handle.
    pub async fn perform_request(&self) -> Result<DomainResponse, RegistryError> {
        let request = self
            .request
            .as_deref()
            .ok_or_else(|| RegistryError::BadState(REQUEST_NOT_SET.to_owned()))?;
        let gateway = self
            .gateway_override
            .as_ref()
            .unwrap_or(&self.default_gateway);

        let options = SendOptions {
            mapper: self.mapper.as_deref(),
            config_override: self.config_override.as_ref(),
            adapter: self.adapter_override.clone(),
            logger: self.logger_override.clone(),
        };
        Ok(gateway.send_request(request, options).await?)
    }
}
