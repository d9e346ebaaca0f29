use std::sync::Arc;

use crate::adapter::Adapter;
use crate::config::AdapterConfig;
use crate::gateway::RequestGateway;
use crate::logging::GatewayLogger;
use crate::mapper::ResponseMapper;
use crate::request::GatewayRequest;

/// Request bound to the parts used to send it
#[derive(Clone, Default)]
pub struct RequestConfig {
    request: Option<Arc<dyn GatewayRequest>>,
    mapper: Option<Arc<dyn ResponseMapper>>,
    config_override: Option<AdapterConfig>,
    adapter_override: Option<Arc<dyn Adapter>>,
    logger_override: Option<Arc<dyn GatewayLogger>>,
    gateway_override: Option<Arc<dyn RequestGateway>>,
}

impl RequestConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn request(mut self, request: Arc<dyn GatewayRequest>) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn mapper(mut self, mapper: Arc<dyn ResponseMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    #[must_use]
    pub fn config_override(mut self, config: AdapterConfig) -> Self {
        self.config_override = Some(config);
        self
    }

    #[must_use]
    pub fn adapter_override(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter_override = Some(adapter);
        self
    }

    #[must_use]
    pub fn logger_override(mut self, logger: Arc<dyn GatewayLogger>) -> Self {
        self.logger_override = Some(logger);
        self
    }

    #[must_use]
    pub fn gateway_override(mut self, gateway: Arc<dyn RequestGateway>) -> Self {
        self.gateway_override = Some(gateway);
        self
    }

    #[must_use]
    pub fn get_request(&self) -> Option<&Arc<dyn GatewayRequest>> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn get_mapper(&self) -> Option<&Arc<dyn ResponseMapper>> {
        self.mapper.as_ref()
    }

    #[must_use]
    pub fn get_config_override(&self) -> Option<&AdapterConfig> {
        self.config_override.as_ref()
    }

    #[must_use]
    pub fn get_adapter_override(&self) -> Option<&Arc<dyn Adapter>> {
        self.adapter_override.as_ref()
    }

    #[must_use]
    pub fn get_logger_override(&self) -> Option<&Arc<dyn GatewayLogger>> {
        self.logger_override.as_ref()
    }

    #[must_use]
    pub fn get_gateway_override(&self) -> Option<&Arc<dyn RequestGateway>> {
        self.gateway_override.as_ref()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::adapter::HyperAdapter;
    use crate::logging::DefaultGatewayLogger;
    use crate::mapper::JsonBodyMapper;
    use crate::request::SimpleRequest;
    use crate::value_object::HttpMethod;

    #[test]
    fn test_empty_config_has_no_parts() {
        let config = RequestConfig::new();
        assert!(config.get_request().is_none());
        assert!(config.get_mapper().is_none());
        assert!(config.get_config_override().is_none());
        assert!(config.get_adapter_override().is_none());
        assert!(config.get_logger_override().is_none());
        assert!(config.get_gateway_override().is_none());
    }

    #[test]
    fn test_builder_keeps_every_part() {
        let request =
            SimpleRequest::parse(HttpMethod::Get, "https://api.example.com/users", None).unwrap();
        let override_config = AdapterConfig::builder().allow_redirects(false).build().unwrap();

        let config = RequestConfig::new()
            .request(Arc::new(request))
            .mapper(Arc::new(JsonBodyMapper))
            .config_override(override_config.clone())
            .adapter_override(Arc::new(HyperAdapter::default()))
            .logger_override(Arc::new(DefaultGatewayLogger::tracing()));

        assert_eq!(
            config.get_request().unwrap().uri().path(),
            "/users"
        );
        assert!(config.get_mapper().is_some());
        assert_eq!(config.get_config_override(), Some(&override_config));
        assert!(config.get_adapter_override().is_some());
        assert!(config.get_logger_override().is_some());
        assert!(config.get_gateway_override().is_none());
    }
}
