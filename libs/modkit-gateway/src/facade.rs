use std::borrow::Cow;
use std::sync::Arc;

use http::Uri;

use crate::adapter::HyperAdapter;
use crate::body::MessageBody;
use crate::config::AdapterConfig;
use crate::error::{GatewayError, MapperError};
use crate::gateway::{Gateway, RequestGateway, SendOptions};
use crate::logging::DefaultGatewayLogger;
use crate::mapper::{ClosureMapper, ResponseMapper};
use crate::request::SimpleRequest;
use crate::response::{DomainResponse, EndpointResponse};
use crate::value_object::HttpMethod;

/// Entry point for one-off requests
///
/// `with_*` methods return configured copies; the original is left
/// untouched, so a base facade can be shared and specialised per call site.
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use modkit_gateway::{HttpMethod, ServiceLayer};
///
/// let response = ServiceLayer::with_default_gateway()
///     .execute_request(
///         "https://api.example.com/users".parse()?,
///         HttpMethod::Get,
///         None,
///         None,
///     )
///     .await?;
/// assert!(response.is_successful());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ServiceLayer {
    gateway: Arc<dyn RequestGateway>,
    mapper: Option<Arc<dyn ResponseMapper>>,
    client_options: Option<AdapterConfig>,
}

impl ServiceLayer {
    #[must_use]
    pub fn new(gateway: Arc<dyn RequestGateway>) -> Self {
        Self {
            gateway,
            mapper: None,
            client_options: None,
        }
    }

    /// Facade over a [`HyperAdapter`] with an empty config, logging through
    /// `tracing`
    #[must_use]
    pub fn with_default_gateway() -> Self {
        let gateway = Gateway::new(
            Arc::new(HyperAdapter::default()),
            Arc::new(DefaultGatewayLogger::tracing()),
        );
        Self::new(Arc::new(gateway))
    }

    #[must_use]
    pub fn with_mapper<F>(&self, map: F) -> Self
    where
        F: Fn(&EndpointResponse) -> Result<DomainResponse, MapperError> + Send + Sync + 'static,
    {
        self.with_response_mapper(Arc::new(ClosureMapper::new(map)))
    }

    #[must_use]
    pub fn with_response_mapper(&self, mapper: Arc<dyn ResponseMapper>) -> Self {
        Self {
            mapper: Some(mapper),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_client_options(&self, options: AdapterConfig) -> Self {
        Self {
            client_options: Some(options),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn RequestGateway> {
        &self.gateway
    }

    /// Send a request built from the arguments
    ///
    /// `client_options` are merged over the facade's own options for this
    /// call.
    ///
    /// # Errors
    /// Returns [`GatewayError`] for failures the gateway does not handle.
    pub async fn execute_request(
        &self,
        uri: Uri,
        method: HttpMethod,
        body: Option<MessageBody>,
        client_options: Option<&AdapterConfig>,
    ) -> Result<DomainResponse, GatewayError> {
        let request = SimpleRequest::new(method, uri, body);
        let options = match (&self.client_options, client_options) {
            (Some(base), Some(call)) => Some(Cow::Owned(base.merge(call))),
            (Some(base), None) => Some(Cow::Borrowed(base)),
            (None, call) => call.map(Cow::Borrowed),
        };

        let send_options = SendOptions {
            mapper: self.mapper.as_deref(),
            config_override: options.as_deref(),
            ..SendOptions::default()
        };
        self.gateway.send_request(&request, send_options).await
    }
}
