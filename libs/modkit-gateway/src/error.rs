use std::time::Duration;
use thiserror::Error;

/// Boxed error used at trait seams (adapters, mappers, cache stores)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Value object validation failures
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValueError {
    #[error("Supplied HTTP method: [{0}] is not supported")]
    UnsupportedMethod(String),

    #[error("Non supported code passed in")]
    UnsupportedStatusCode(u16),

    #[error("Timeout value should be 0.0 or greater. Supplied value: [{0:.1}]")]
    NegativeTimeout(f64),

    #[error(
        "Timeout value should be a finite number of seconds that fits a duration. Supplied value: [{0}]"
    )]
    UnrepresentableTimeout(f64),

    #[error("Login could not be a blank string")]
    BlankLogin,

    #[error("Password could not be a blank string")]
    BlankPassword,

    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },
}

/// Adapter config validation and transformation failures
///
/// Raised when a config is built, never at send time for a config that
/// already passed validation (except for transformer-only checks such as
/// the auth scheme or header syntax).
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Timeout value should be a valid number")]
    InvalidTimeout,

    #[error("Connect timeout value should be a valid number")]
    InvalidConnectTimeout,

    /// Numeric timeout rejected by [`crate::Timeout`]
    #[error("Invalid `{field}` option: {source}")]
    TimeoutOutOfRange {
        field: &'static str,
        #[source]
        source: ValueError,
    },

    #[error("Verify value should be a valid boolean or a string path")]
    InvalidVerify,

    #[error("Allow redirects value should be a valid boolean")]
    InvalidAllowRedirects,

    #[error("Auth value should be a valid array")]
    InvalidAuth,

    #[error("Auth value requires at least two items in the array config")]
    AuthTooShort,

    #[error("Auth item at position {0} should be a string")]
    InvalidAuthItem(usize),

    #[error("Auth scheme: [{0}] is not supported")]
    UnsupportedAuthScheme(String),

    #[error("Headers value should be a valid map")]
    InvalidHeaders,

    #[error("Header `{0}` should be a string or an array of strings")]
    InvalidHeaderEntry(String),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid value for header `{0}`")]
    InvalidHeaderValue(String),

    /// Native option present with a value the transport cannot use
    #[error("Option `{key}` should be {expected}")]
    InvalidOption { key: String, expected: &'static str },

    #[error("Adapter config should be a map of options")]
    NotAMap,

    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Errors produced by an [`crate::Adapter`]
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AdapterError {
    /// No response was received (DNS, connect, TLS handshake, protocol)
    ///
    /// `message` carries the full source chain of the transport error.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    /// Total request deadline exceeded
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Response body exceeded the configured size limit
    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// TLS client configuration could not be built
    #[error("TLS error: {0}")]
    Tls(#[source] BoxError),

    #[error("Invalid request URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: &'static str },

    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Value(#[from] ValueError),

    /// Anything the adapter cannot classify; propagated by the gateway
    #[error(transparent)]
    Unexpected(BoxError),
}

impl AdapterError {
    /// Build a transport error, flattening the source chain into the message
    #[must_use]
    pub fn transport(source: BoxError) -> Self {
        let message = error_chain_message(source.as_ref());
        Self::Transport { message, source }
    }

    /// Whether the gateway turns this error into an error domain response
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }
}

/// Errors produced by a [`crate::ResponseMapper`]
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MapperError {
    /// The endpoint response cannot be mapped into the domain shape
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Unexpected(BoxError),
}

impl MapperError {
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Errors escaping [`crate::RequestGateway::send_request`]
///
/// Recognized failures are folded into an error domain response; only
/// unrecognized ones surface here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("Unhandled failure while sending request: {0}")]
    Unhandled(#[source] BoxError),
}

/// Cache store failures
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Cache backend failure: {0}")]
    Backend(#[source] BoxError),

    #[error("Cache entry could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Registry and use case failures
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("{0}")]
    BadConfig(String),

    #[error("{0}")]
    BadState(String),

    #[error("Request with name: [{0}] is not registered")]
    RequestNotRegistered(String),

    /// A declaratively configured request could not be built
    #[error("Request `{name}` is misconfigured: {source}")]
    Request {
        name: String,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to load service layer settings: {0}")]
    Settings(#[source] Box<figment::Error>),
}

impl From<figment::Error> for RegistryError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}

/// Join an error and its sources with `": "`
#[must_use]
pub fn error_chain_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        // hyper-util repeats the inner message in some Display impls
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = source.source();
    }
    message
}
