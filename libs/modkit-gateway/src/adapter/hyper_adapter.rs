use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use parking_lot::Mutex;
use tower::{Service, ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use tower_http::follow_redirect::FollowRedirectLayer;

use super::redirect::RedirectPolicy;
use super::{Adapter, tls};
use crate::config::{
    AdapterConfig, HyperConfigTransformer, RedirectMode, TlsVerification, TransportOptions,
};
use crate::error::{AdapterError, BoxError};
use crate::request::OutboundRequest;
use crate::response::EndpointResponse;
use crate::value_object::StatusCode;

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Pooled clients are shared by every call with the same connector settings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConnectorKey {
    connect_timeout: Option<Duration>,
    tls: TlsVerification,
}

/// [`Adapter`] over the hyper legacy client
///
/// Per-call settings (timeout, redirects, headers, auth, body limit) are
/// resolved on every send; connector settings select a cached pooled
/// client.
pub struct HyperAdapter {
    config: AdapterConfig,
    clients: Mutex<HashMap<ConnectorKey, HyperClient>>,
}

impl HyperAdapter {
    #[must_use]
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn client_for(&self, options: &TransportOptions) -> Result<HyperClient, AdapterError> {
        let key = ConnectorKey {
            connect_timeout: options.connect_timeout,
            tls: options.tls.clone(),
        };

        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let connector = tls::build_https_connector(&key.tls, key.connect_timeout)?;
        let client: HyperClient = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .build(connector);
        tracing::debug!(
            connect_timeout = ?key.connect_timeout,
            tls = ?key.tls,
            "Created pooled HTTP client"
        );
        clients.insert(key, client.clone());
        Ok(client)
    }
}

impl Default for HyperAdapter {
    fn default() -> Self {
        Self::new(AdapterConfig::default())
    }
}

#[async_trait]
impl Adapter for HyperAdapter {
    async fn send(
        &self,
        request: &OutboundRequest,
        config_override: Option<&AdapterConfig>,
    ) -> Result<EndpointResponse, AdapterError> {
        let effective = match config_override {
            Some(config_override) => self.config.merge(config_override),
            None => self.config.clone(),
        };
        let mut options = HyperConfigTransformer::transform(&effective)?;
        // request headers win over configured ones
        options.apply_request_headers(request.headers())?;

        let http_request = build_request(request, &options)?;
        let client = self.client_for(&options)?;

        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            timeout = ?options.timeout,
            "Sending request"
        );

        let exchange = dispatch(client, http_request, options.redirects, options.max_body_size);
        match options.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| AdapterError::Timeout(limit))?,
            None => exchange.await,
        }
    }
}

fn build_request(
    request: &OutboundRequest,
    options: &TransportOptions,
) -> Result<Request<Full<Bytes>>, AdapterError> {
    let uri = request.uri();
    if uri.scheme().is_none() {
        return Err(AdapterError::InvalidUri {
            uri: uri.to_string(),
            reason: "missing scheme (expected http or https)",
        });
    }
    if uri.authority().is_none() {
        return Err(AdapterError::InvalidUri {
            uri: uri.to_string(),
            reason: "missing host",
        });
    }

    let mut builder = Request::builder()
        .method(request.method().to_http())
        .uri(uri.clone());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(options.headers.clone());
    }
    Ok(builder.body(Full::new(request.body().bytes()))?)
}

async fn dispatch(
    client: HyperClient,
    request: Request<Full<Bytes>>,
    redirects: RedirectMode,
    max_body_size: usize,
) -> Result<EndpointResponse, AdapterError> {
    match redirects {
        RedirectMode::Follow { max } => {
            let service = ServiceBuilder::new()
                .layer(DecompressionLayer::new())
                .layer(FollowRedirectLayer::with_policy(RedirectPolicy::new(max)))
                .service(client);
            exchange(service, request, max_body_size).await
        }
        RedirectMode::Disabled => {
            let service = ServiceBuilder::new()
                .layer(DecompressionLayer::new())
                .service(client);
            exchange(service, request, max_body_size).await
        }
    }
}

async fn exchange<S, B>(
    service: S,
    request: Request<Full<Bytes>>,
    max_body_size: usize,
) -> Result<EndpointResponse, AdapterError>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>>,
    S::Error: Into<BoxError>,
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let response = service
        .oneshot(request)
        .await
        .map_err(|e| AdapterError::transport(e.into()))?;

    let (parts, body) = response.into_parts();
    let body = read_body_limited(body, max_body_size).await?;
    let status = StatusCode::try_from(parts.status)?;

    tracing::debug!(status = %status, bytes = body.len(), "Received response");
    Ok(EndpointResponse::new(status, body.into(), parts.headers))
}

/// Collect a (decompressed) body, failing once it exceeds `limit`
async fn read_body_limited<B>(body: B, limit: usize) -> Result<Bytes, AdapterError>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| AdapterError::transport(e.into()))?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(AdapterError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
