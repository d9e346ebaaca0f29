use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::keys;
use crate::error::ConfigError;
use crate::headers::header_values;
use crate::value_object::{Login, Password, Timeout};

/// Validated, transport-agnostic adapter options
///
/// Options are kept as an ordered JSON map so configs can come from code,
/// from settings files, or from callers passing raw options. Unknown keys
/// pass validation and are handed to the transformer unchanged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AdapterConfig {
    options: Map<String, Value>,
}

impl AdapterConfig {
    /// # Errors
    /// Returns [`ConfigError`] naming the first invalid option.
    pub fn from_map(options: Map<String, Value>) -> Result<Self, ConfigError> {
        validate(&options)?;
        Ok(Self { options })
    }

    /// # Errors
    /// Returns [`ConfigError::NotAMap`] unless `value` is an object, then
    /// validates like [`from_map`](Self::from_map).
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(options) => Self::from_map(options),
            _ => Err(ConfigError::NotAMap),
        }
    }

    #[must_use]
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    #[must_use]
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    #[must_use]
    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.options.get(keys::HEADERS).and_then(Value::as_object)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Combine two configs, `other` winning
    ///
    /// Every key of `other` replaces the same key here, except `headers`,
    /// which are merged by header name (case-insensitively) with `other`
    /// winning per header. Keys only present here are kept.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut options = self.options.clone();
        for (key, value) in &other.options {
            if key == keys::HEADERS
                && let (Some(Value::Object(base)), Value::Object(incoming)) =
                    (options.get_mut(keys::HEADERS), value)
            {
                merge_headers(base, incoming);
                continue;
            }
            options.insert(key.clone(), value.clone());
        }
        Self { options }
    }
}

fn merge_headers(base: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (name, value) in incoming {
        base.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        base.insert(name.clone(), value.clone());
    }
}

fn validate(options: &Map<String, Value>) -> Result<(), ConfigError> {
    if let Some(value) = options.get(keys::TIMEOUT) {
        validate_timeout(value, keys::TIMEOUT, ConfigError::InvalidTimeout)?;
    }
    if let Some(value) = options.get(keys::CONNECT_TIMEOUT) {
        validate_timeout(value, keys::CONNECT_TIMEOUT, ConfigError::InvalidConnectTimeout)?;
    }
    if let Some(value) = options.get(keys::VERIFY)
        && !(value.is_boolean() || value.is_string())
    {
        return Err(ConfigError::InvalidVerify);
    }
    if let Some(value) = options.get(keys::ALLOW_REDIRECTS)
        && !value.is_boolean()
    {
        return Err(ConfigError::InvalidAllowRedirects);
    }
    if let Some(value) = options.get(keys::AUTH) {
        let items = value.as_array().ok_or(ConfigError::InvalidAuth)?;
        if items.len() < 2 {
            return Err(ConfigError::AuthTooShort);
        }
        // login, password, scheme
        if let Some(position) = items.iter().take(3).position(|item| !item.is_string()) {
            return Err(ConfigError::InvalidAuthItem(position));
        }
    }
    if let Some(value) = options.get(keys::HEADERS) {
        let headers = value.as_object().ok_or(ConfigError::InvalidHeaders)?;
        for (name, entry) in headers {
            header_values(name, entry)?;
        }
    }
    Ok(())
}

fn validate_timeout(
    value: &Value,
    field: &'static str,
    not_a_number: ConfigError,
) -> Result<(), ConfigError> {
    let seconds = value.as_f64().ok_or(not_a_number)?;
    Timeout::from_secs_f64(seconds)
        .map(|_| ())
        .map_err(|source| ConfigError::TimeoutOutOfRange { field, source })
}

impl TryFrom<Map<String, Value>> for AdapterConfig {
    type Error = ConfigError;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_map(value)
    }
}

impl TryFrom<Value> for AdapterConfig {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<AdapterConfig> for Map<String, Value> {
    fn from(value: AdapterConfig) -> Self {
        value.options
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visible = self.options.clone();
        if visible.contains_key(keys::AUTH) {
            visible.insert(keys::AUTH.to_owned(), Value::String("[REDACTED]".to_owned()));
        }
        f.debug_struct("AdapterConfig")
            .field("options", &visible)
            .finish()
    }
}

/// Typed construction of an [`AdapterConfig`]
#[derive(Clone, Default)]
pub struct AdapterConfigBuilder {
    options: Map<String, Value>,
}

impl AdapterConfigBuilder {
    #[must_use]
    pub fn timeout(self, timeout: Timeout) -> Self {
        self.option(keys::TIMEOUT, timeout.as_secs_f64())
    }

    #[must_use]
    pub fn connect_timeout(self, timeout: Timeout) -> Self {
        self.option(keys::CONNECT_TIMEOUT, timeout.as_secs_f64())
    }

    #[must_use]
    pub fn verify(self, enabled: bool) -> Self {
        self.option(keys::VERIFY, enabled)
    }

    /// Verify peers against the PEM bundle at `path` only
    #[must_use]
    pub fn ca_bundle(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.option(keys::VERIFY, path)
    }

    #[must_use]
    pub fn allow_redirects(self, allow: bool) -> Self {
        self.option(keys::ALLOW_REDIRECTS, allow)
    }

    #[must_use]
    pub fn auth(self, login: &Login, password: &Password) -> Self {
        self.option(
            keys::AUTH,
            Value::Array(vec![login.as_str().into(), password.expose().into()]),
        )
    }

    #[must_use]
    pub fn auth_with_scheme(self, login: &Login, password: &Password, scheme: &str) -> Self {
        self.option(
            keys::AUTH,
            Value::Array(vec![
                login.as_str().into(),
                password.expose().into(),
                scheme.into(),
            ]),
        )
    }

    /// Add a header; repeated calls for the same name replace the value
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let headers = self
            .options
            .entry(keys::HEADERS)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(headers) = headers {
            merge_headers(headers, &Map::from_iter([(name.to_owned(), Value::from(value))]));
        }
        self
    }

    /// Set any option, including transport-native ones
    #[must_use]
    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_owned(), value.into());
        self
    }

    /// # Errors
    /// Returns [`ConfigError`] if an option set through [`option`](Self::option)
    /// is invalid.
    pub fn build(self) -> Result<AdapterConfig, ConfigError> {
        AdapterConfig::from_map(self.options)
    }
}
