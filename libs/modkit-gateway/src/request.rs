use http::{HeaderMap, HeaderName, HeaderValue, Uri};

use crate::body::MessageBody;
use crate::error::{ConfigError, ValueError};
use crate::value_object::HttpMethod;

/// A request the gateway can send
///
/// Implementations describe the request; [`to_outbound`](Self::to_outbound)
/// turns the description into the value handed to adapters. The `censored_*`
/// methods select what may appear in logs and default to the real values.
pub trait GatewayRequest: Send + Sync {
    fn method(&self) -> HttpMethod;

    fn uri(&self) -> Uri;

    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    fn body(&self) -> Option<MessageBody> {
        None
    }

    fn censored_uri(&self) -> Uri {
        self.uri()
    }

    fn censored_headers(&self) -> HeaderMap {
        self.headers()
    }

    fn censored_body(&self) -> Option<MessageBody> {
        self.body()
    }

    fn to_outbound(&self) -> OutboundRequest {
        OutboundRequest {
            method: self.method(),
            uri: self.uri(),
            headers: self.headers(),
            body: self.body().unwrap_or_default(),
        }
    }
}

/// Fully resolved request as seen by adapters and cache policies
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    body: MessageBody,
}

impl OutboundRequest {
    #[must_use]
    pub fn new(method: HttpMethod, uri: Uri, headers: HeaderMap, body: MessageBody) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &MessageBody {
        &self.body
    }
}

/// Plain request built from a method, a URI and an optional body
#[derive(Debug, Clone)]
pub struct SimpleRequest {
    method: HttpMethod,
    uri: Uri,
    body: Option<MessageBody>,
    headers: HeaderMap,
}

impl SimpleRequest {
    #[must_use]
    pub fn new(method: HttpMethod, uri: Uri, body: Option<MessageBody>) -> Self {
        Self {
            method,
            uri,
            body,
            headers: HeaderMap::new(),
        }
    }

    /// # Errors
    /// Returns [`ValueError::InvalidUri`] if `uri` does not parse.
    pub fn parse(method: HttpMethod, uri: &str, body: Option<MessageBody>) -> Result<Self, ValueError> {
        let parsed = uri.parse::<Uri>().map_err(|e| ValueError::InvalidUri {
            uri: uri.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(method, parsed, body))
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// # Errors
    /// Returns [`ConfigError`] if the name or value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(name.to_owned()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| ConfigError::InvalidHeaderValue(name.to_owned()))?;
        self.headers.append(header_name, header_value);
        Ok(self)
    }
}

impl GatewayRequest for SimpleRequest {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn uri(&self) -> Uri {
        self.uri.clone()
    }

    fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    fn body(&self) -> Option<MessageBody> {
        self.body.clone()
    }
}
