//! Platform-independent adapter options and their translation into
//! transport settings

mod adapter_config;
mod transformer;

pub use adapter_config::{AdapterConfig, AdapterConfigBuilder};
pub use transformer::{
    AuthCredentials, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_REDIRECTS, HyperConfigTransformer,
    RedirectMode, TlsVerification, TransportOptions,
};

/// Option names understood by [`AdapterConfig`]
pub mod keys {
    /// Total request timeout in seconds (float), `0` waits indefinitely
    pub const TIMEOUT: &str = "timeout";
    /// Connect timeout in seconds (float), `0` waits indefinitely
    pub const CONNECT_TIMEOUT: &str = "connect_timeout";
    /// `true`, `false` or a path to a PEM CA bundle
    pub const VERIFY: &str = "verify";
    pub const ALLOW_REDIRECTS: &str = "allow_redirects";
    /// `[login, password]` or `[login, password, scheme]`
    pub const AUTH: &str = "auth";
    pub const HEADERS: &str = "headers";
    pub const MAX_REDIRECTS: &str = "max_redirects";
    pub const MAX_BODY_SIZE: &str = "max_body_size";
}
