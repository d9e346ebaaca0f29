use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::gateway::RequestGateway;
use crate::registry::request_config::RequestConfig;
use crate::registry::settings::ServiceLayerSettings;
use crate::registry::use_case::GatewayUseCase;
use crate::response::DomainResponse;

/// Input of [`GatewayUseCaseRegistry::from_config`]
#[derive(Clone, Default)]
pub struct RegistryConfig {
    pub default_gateway: Option<Arc<dyn RequestGateway>>,
    pub requests: Option<BTreeMap<String, RequestConfig>>,
}

impl RegistryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_gateway(mut self, gateway: Arc<dyn RequestGateway>) -> Self {
        self.default_gateway = Some(gateway);
        self
    }

    /// Register `config` under `name`, replacing an earlier registration
    #[must_use]
    pub fn request(mut self, name: impl Into<String>, config: RequestConfig) -> Self {
        self.requests
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), config);
        self
    }
}

/// Use cases addressable by request name
pub struct GatewayUseCaseRegistry {
    use_cases: BTreeMap<String, GatewayUseCase>,
}

impl GatewayUseCaseRegistry {
    /// # Errors
    /// Returns [`RegistryError::BadConfig`] if the default gateway is missing
    /// or no request is registered.
    pub fn from_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let default_gateway = config.default_gateway.ok_or_else(|| {
            RegistryError::BadConfig("Required key: [defaultGateway] is not set in config".to_owned())
        })?;
        let requests = config.requests.ok_or_else(|| {
            RegistryError::BadConfig("Required key: [requests] is not set in config".to_owned())
        })?;
        if requests.is_empty() {
            return Err(RegistryError::BadConfig(
                "Required key: [requests] is empty".to_owned(),
            ));
        }

        let use_cases = requests
            .into_iter()
            .map(|(name, request_config)| {
                let use_case = build_use_case(Arc::clone(&default_gateway), &request_config);
                (name, use_case)
            })
            .collect();
        Ok(Self { use_cases })
    }

    /// Build a registry from declarative settings
    ///
    /// The settings' base adapter config is applied under each request's own
    /// override.
    ///
    /// # Errors
    /// Returns [`RegistryError::Request`] if a request cannot be built and
    /// [`RegistryError::BadConfig`] if no request is configured.
    pub fn from_settings(
        default_gateway: Arc<dyn RequestGateway>,
        settings: &ServiceLayerSettings,
    ) -> Result<Self, RegistryError> {
        let mut config = RegistryConfig::new().default_gateway(default_gateway);
        config.requests = Some(BTreeMap::new());
        for (name, request_settings) in &settings.requests {
            let request = request_settings
                .to_request()
                .map_err(|source| RegistryError::Request {
                    name: name.clone(),
                    source,
                })?;
            let override_config = match &request_settings.config_override {
                Some(request_override) => settings.adapter.merge(request_override),
                None => settings.adapter.clone(),
            };

            let mut request_config = RequestConfig::new().request(Arc::new(request));
            if !override_config.is_empty() {
                request_config = request_config.config_override(override_config);
            }
            config = config.request(name.clone(), request_config);
        }
        tracing::debug!(requests = settings.requests.len(), "Building use case registry from settings");
        Self::from_config(config)
    }

    /// # Errors
    /// Returns [`RegistryError::RequestNotRegistered`] for an unknown name,
    /// otherwise whatever [`GatewayUseCase::perform_request`] returns.
    pub async fn process_use_case(&self, name: &str) -> Result<DomainResponse, RegistryError> {
        self.get_configured_use_case(name)?.perform_request().await
    }

    /// # Errors
    /// Returns [`RegistryError::RequestNotRegistered`] for an unknown name.
    pub fn get_configured_use_case(&self, name: &str) -> Result<&GatewayUseCase, RegistryError> {
        self.use_cases
            .get(name)
            .ok_or_else(|| RegistryError::RequestNotRegistered(name.to_owned()))
    }

    /// Registered request names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.use_cases.keys().map(String::as_str)
    }
}

fn build_use_case(default_gateway: Arc<dyn RequestGateway>, config: &RequestConfig) -> GatewayUseCase {
    let mut use_case = GatewayUseCase::new(default_gateway);
    if let Some(request) = config.get_request() {
        use_case = use_case.set_request_to_send(Arc::clone(request));
    }
    if let Some(mapper) = config.get_mapper() {
        use_case = use_case.with_mapper(Arc::clone(mapper));
    }
    if let Some(override_config) = config.get_config_override() {
        use_case = use_case.with_config_override(override_config.clone());
    }
    if let Some(gateway) = config.get_gateway_override() {
        use_case = use_case.through_gateway_override(Arc::clone(gateway));
    }
    if let Some(adapter) = config.get_adapter_override() {
        use_case = use_case.via_adapter(Arc::clone(adapter));
    }
    if let Some(logger) = config.get_logger_override() {
        use_case = use_case.use_logger(Arc::clone(logger));
    }
    use_case
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::config::AdapterConfig;
    use crate::error::AdapterError;
    use crate::gateway::Gateway;
    use crate::logging::{DefaultGatewayLogger, RecordingLogSink};
    use crate::request::{OutboundRequest, SimpleRequest};
    use crate::response::EndpointResponse;
    use crate::value_object::{HttpMethod, StatusCode};
    use async_trait::async_trait;
    use http::HeaderMap;

    /// Answers with the request path as body
    struct PathAdapter;

    #[async_trait]
    impl Adapter for PathAdapter {
        async fn send(
            &self,
            request: &OutboundRequest,
            _config_override: Option<&AdapterConfig>,
        ) -> Result<EndpointResponse, AdapterError> {
            Ok(EndpointResponse::new(
                StatusCode::OK,
                request.uri().path().to_owned().into(),
                HeaderMap::new(),
            ))
        }
    }

    fn gateway() -> Arc<dyn RequestGateway> {
        Arc::new(Gateway::new(
            Arc::new(PathAdapter),
            Arc::new(DefaultGatewayLogger::new(Arc::new(RecordingLogSink::new()))),
        ))
    }

    fn request_config(path: &str) -> RequestConfig {
        let uri = format!("https://api.example.com{path}");
        RequestConfig::new().request(Arc::new(
            SimpleRequest::parse(HttpMethod::Get, &uri, None).unwrap(),
        ))
    }

    fn bad_config_message(config: RegistryConfig) -> String {
        match GatewayUseCaseRegistry::from_config(config) {
            Err(RegistryError::BadConfig(message)) => message,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("config should be rejected"),
        }
    }

    #[test]
    fn test_missing_default_gateway_is_rejected() {
        let config = RegistryConfig::new().request("users", request_config("/users"));
        assert_eq!(
            bad_config_message(config),
            "Required key: [defaultGateway] is not set in config"
        );
    }

    #[test]
    fn test_missing_requests_are_rejected() {
        let config = RegistryConfig::new().default_gateway(gateway());
        assert_eq!(
            bad_config_message(config),
            "Required key: [requests] is not set in config"
        );
    }

    #[test]
    fn test_empty_requests_are_rejected() {
        let mut config = RegistryConfig::new().default_gateway(gateway());
        config.requests = Some(BTreeMap::new());
        assert_eq!(bad_config_message(config), "Required key: [requests] is empty");
    }

    #[tokio::test]
    async fn test_process_use_case_by_name() {
        let registry = GatewayUseCaseRegistry::from_config(
            RegistryConfig::new()
                .default_gateway(gateway())
                .request("users", request_config("/users"))
                .request("orders", request_config("/orders")),
        )
        .unwrap();

        let orders = registry.process_use_case("orders").await.unwrap();

        assert_eq!(orders.body_text(), "/orders");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn test_unknown_name_is_not_registered() {
        let registry = GatewayUseCaseRegistry::from_config(
            RegistryConfig::new()
                .default_gateway(gateway())
                .request("users", request_config("/users")),
        )
        .unwrap();

        let err = registry.process_use_case("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Request with name: [missing] is not registered");
        assert!(registry.get_configured_use_case("missing").is_err());
    }

    #[tokio::test]
    async fn test_registered_without_request_fails_on_perform() {
        let registry = GatewayUseCaseRegistry::from_config(
            RegistryConfig::new()
                .default_gateway(gateway())
                .request("later", RequestConfig::new()),
        )
        .unwrap();

        let err = registry.process_use_case("later").await.unwrap_err();
        assert!(matches!(err, RegistryError::BadState(_)));

        let use_case = registry
            .get_configured_use_case("later")
            .unwrap()
            .clone()
            .set_request_to_send(Arc::new(
                SimpleRequest::parse(HttpMethod::Get, "https://api.example.com/late", None).unwrap(),
            ));
        assert_eq!(use_case.perform_request().await.unwrap().body_text(), "/late");
    }
}
