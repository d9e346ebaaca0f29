use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Map, Value};

use super::adapter_config::AdapterConfig;
use super::keys;
use crate::error::ConfigError;
use crate::headers::json_to_header_map;
use crate::value_object::{Login, Password, Timeout};

/// Redirects followed when `allow_redirects` is on and no `max_redirects` is set
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Response body limit when no `max_body_size` is set (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// How server certificates are checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TlsVerification {
    /// Mozilla roots (webpki)
    #[default]
    Enabled,
    /// Any certificate is accepted
    Disabled,
    /// Only certificates chaining to the PEM bundle at this path
    CaBundle(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Follow { max: usize },
    Disabled,
}

impl Default for RedirectMode {
    fn default() -> Self {
        Self::Follow {
            max: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Credentials from the `auth` option
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCredentials {
    pub login: Login,
    pub password: Password,
}

impl AuthCredentials {
    /// `Authorization: Basic ...` value, marked sensitive
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidHeaderValue`] if the encoded value is not
    /// a valid header (cannot happen for base64 output).
    pub fn basic_header(&self) -> Result<HeaderValue, ConfigError> {
        let token = STANDARD.encode(format!("{}:{}", self.login.as_str(), self.password.expose()));
        let mut value = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|_| ConfigError::InvalidHeaderValue(AUTHORIZATION.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Transport settings resolved from an [`AdapterConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    /// Deadline for the whole exchange, body included; `None` waits forever
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub tls: TlsVerification,
    pub redirects: RedirectMode,
    pub auth: Option<AuthCredentials>,
    /// Config headers, then request headers, with `Authorization` replaced
    /// when `auth` is set
    pub headers: HeaderMap,
    pub max_body_size: usize,
    /// Options this transport does not understand
    pub extra: Map<String, Value>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            tls: TlsVerification::default(),
            redirects: RedirectMode::default(),
            auth: None,
            headers: HeaderMap::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            extra: Map::new(),
        }
    }
}

impl TransportOptions {
    /// Lay request headers over the configured ones, name by name
    ///
    /// Values are copied as-is, so non-UTF-8 bytes and the sensitive flag
    /// survive. Credentials from `auth` still win over a request
    /// `Authorization` header.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidHeaderValue`] if the Basic header
    /// cannot be built.
    pub fn apply_request_headers(&mut self, headers: &HeaderMap) -> Result<(), ConfigError> {
        for name in headers.keys() {
            self.headers.remove(name);
        }
        for (name, value) in headers {
            self.headers.append(name.clone(), value.clone());
        }
        if let Some(auth) = &self.auth {
            self.headers.insert(AUTHORIZATION, auth.basic_header()?);
        }
        Ok(())
    }
}

/// Maps platform-independent options onto the hyper transport
pub struct HyperConfigTransformer;

impl HyperConfigTransformer {
    /// # Errors
    /// Returns [`ConfigError`] for values only the transport can reject:
    /// blank credentials, unsupported auth schemes, invalid header syntax and
    /// malformed native options.
    pub fn transform(config: &AdapterConfig) -> Result<TransportOptions, ConfigError> {
        let mut options = TransportOptions::default();
        let mut max_redirects = DEFAULT_MAX_REDIRECTS;
        let mut follow_redirects = true;

        for (key, value) in config.options() {
            match key.as_str() {
                keys::TIMEOUT => {
                    options.timeout = duration(value, keys::TIMEOUT, ConfigError::InvalidTimeout)?;
                }
                keys::CONNECT_TIMEOUT => {
                    options.connect_timeout = duration(
                        value,
                        keys::CONNECT_TIMEOUT,
                        ConfigError::InvalidConnectTimeout,
                    )?;
                }
                keys::VERIFY => options.tls = verification(value)?,
                keys::ALLOW_REDIRECTS => {
                    follow_redirects = value.as_bool().ok_or(ConfigError::InvalidAllowRedirects)?;
                }
                keys::AUTH => options.auth = Some(credentials(value)?),
                keys::HEADERS => {
                    let headers = value.as_object().ok_or(ConfigError::InvalidHeaders)?;
                    options.headers = json_to_header_map(headers)?;
                }
                keys::MAX_REDIRECTS => max_redirects = size(value, keys::MAX_REDIRECTS)?,
                keys::MAX_BODY_SIZE => options.max_body_size = size(value, keys::MAX_BODY_SIZE)?,
                _ => {
                    tracing::debug!(option = %key, "Ignoring adapter option unknown to the hyper transport");
                    options.extra.insert(key.clone(), value.clone());
                }
            }
        }

        options.redirects = if follow_redirects {
            RedirectMode::Follow { max: max_redirects }
        } else {
            RedirectMode::Disabled
        };

        if let Some(auth) = &options.auth {
            options.headers.insert(AUTHORIZATION, auth.basic_header()?);
        }

        Ok(options)
    }
}

fn duration(
    value: &Value,
    field: &'static str,
    not_a_number: ConfigError,
) -> Result<Option<Duration>, ConfigError> {
    let seconds = value.as_f64().ok_or(not_a_number)?;
    let timeout = Timeout::from_secs_f64(seconds)
        .map_err(|source| ConfigError::TimeoutOutOfRange { field, source })?;
    Ok(timeout.to_duration())
}

fn verification(value: &Value) -> Result<TlsVerification, ConfigError> {
    match value {
        Value::Bool(true) => Ok(TlsVerification::Enabled),
        Value::Bool(false) => Ok(TlsVerification::Disabled),
        Value::String(path) => Ok(TlsVerification::CaBundle(PathBuf::from(path))),
        _ => Err(ConfigError::InvalidVerify),
    }
}

fn credentials(value: &Value) -> Result<AuthCredentials, ConfigError> {
    let items = value.as_array().ok_or(ConfigError::InvalidAuth)?;
    let login = Login::new(auth_item(items, 0)?)?;
    let password = Password::new(auth_item(items, 1)?)?;
    if items.len() > 2 {
        let scheme = auth_item(items, 2)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(ConfigError::UnsupportedAuthScheme(scheme.to_owned()));
        }
    }
    Ok(AuthCredentials { login, password })
}

fn auth_item(items: &[Value], position: usize) -> Result<&str, ConfigError> {
    items
        .get(position)
        .ok_or(ConfigError::AuthTooShort)?
        .as_str()
        .ok_or(ConfigError::InvalidAuthItem(position))
}

fn size(value: &Value, key: &str) -> Result<usize, ConfigError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ConfigError::InvalidOption {
            key: key.to_owned(),
            expected: "a non-negative integer",
        })
}
