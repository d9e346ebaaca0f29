//! Named, preconfigured gateway requests

mod request_config;
mod settings;
mod use_case;
mod use_case_registry;

pub use request_config::RequestConfig;
pub use settings::{RequestSettings, SETTINGS_ENV_PREFIX, ServiceLayerSettings};
pub use use_case::GatewayUseCase;
pub use use_case_registry::{GatewayUseCaseRegistry, RegistryConfig};
