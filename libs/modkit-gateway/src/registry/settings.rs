use std::collections::BTreeMap;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Serialize};

use crate::body::MessageBody;
use crate::config::AdapterConfig;
use crate::error::{ConfigError, RegistryError};
use crate::request::SimpleRequest;
use crate::value_object::HttpMethod;

/// Prefix of environment variables layered over the settings file
///
/// Nested keys are separated by `__`, e.g.
/// `SERVICE_LAYER_REQUESTS__USERS__URI`.
pub const SETTINGS_ENV_PREFIX: &str = "SERVICE_LAYER_";

/// Declarative service layer settings
///
/// ```yaml
/// adapter:
///   timeout: 5.0
///   headers:
///     Accept: application/json
/// requests:
///   users:
///     method: GET
///     uri: https://api.example.com/users
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceLayerSettings {
    /// Applied to every configured request
    pub adapter: AdapterConfig,
    pub requests: BTreeMap<String, RequestSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSettings {
    pub method: HttpMethod,
    pub uri: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub config_override: Option<AdapterConfig>,
}

impl ServiceLayerSettings {
    /// Load `path` (YAML) layered with `SERVICE_LAYER_*` environment variables
    ///
    /// # Errors
    /// Returns [`RegistryError::Settings`] if a source cannot be read or the
    /// merged values do not form valid settings.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let figment = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    /// # Errors
    /// Returns [`RegistryError::Settings`] if extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, RegistryError> {
        let settings: Self = figment.extract()?;
        tracing::debug!(requests = settings.requests.len(), "Loaded service layer settings");
        Ok(settings)
    }
}

impl RequestSettings {
    /// # Errors
    /// Returns [`ConfigError`] if the URI or a header is invalid.
    pub fn to_request(&self) -> Result<SimpleRequest, ConfigError> {
        let body = self.body.clone().map(MessageBody::from);
        let mut request = SimpleRequest::parse(self.method, &self.uri, body)?;
        for (name, value) in &self.headers {
            request = request.with_header(name, value)?;
        }
        Ok(request)
    }
}
