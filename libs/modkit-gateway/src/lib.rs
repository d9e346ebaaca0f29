#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Gateway service layer for outbound HTTP calls in `ModKit`
//!
//! Callers describe a request, hand it to a [`RequestGateway`] and get a
//! [`DomainResponse`] back. Between the two sit:
//! - an [`Adapter`] doing the actual exchange ([`HyperAdapter`]: hyper +
//!   rustls, pooled, with redirects and transparent decompression)
//! - an optional [`ResponseMapper`] shaping the endpoint response
//! - a [`GatewayLogger`] recording every exchange with censored request data
//! - an optional [`GatewayCachingProxy`] serving repeated requests from a
//!   [`CacheStore`]
//!
//! Error statuses are regular responses. Failures the gateway recognizes
//! (transport errors, timeouts, mapper rejections) come back as
//! [`DomainResponse::Error`]; anything else is a [`GatewayError`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use modkit_gateway::{
//!     AdapterConfig, DefaultGatewayLogger, Gateway, HyperAdapter, HttpMethod, RequestGateway,
//!     SendOptions, SimpleRequest, Timeout,
//! };
//!
//! let config = AdapterConfig::builder()
//!     .timeout(Timeout::from_secs_f64(5.0)?)
//!     .header("Accept", "application/json")
//!     .build()?;
//! let gateway = Gateway::new(
//!     Arc::new(HyperAdapter::new(config)),
//!     Arc::new(DefaultGatewayLogger::tracing()),
//! );
//!
//! let request = SimpleRequest::parse(HttpMethod::Get, "https://api.example.com/users", None)?;
//! let response = gateway.send_request(&request, SendOptions::new()).await?;
//! ```

mod adapter;
mod body;
mod cache;
pub mod config;
mod error;
mod facade;
mod gateway;
pub mod headers;
pub mod logging;
mod mapper;
mod registry;
mod request;
mod response;
mod value_object;

pub use adapter::{Adapter, HyperAdapter, RedirectPolicy};
pub use body::MessageBody;
pub use cache::{
    CacheKeyDerivation, CachePolicy, CacheStore, DEFAULT_CACHE_CAPACITY, DefaultCachePolicy,
    GatewayCachingProxy, InMemoryCacheStore,
};
pub use config::{AdapterConfig, AdapterConfigBuilder, HyperConfigTransformer, TransportOptions};
pub use error::{
    AdapterError, BoxError, CacheError, ConfigError, GatewayError, MapperError, RegistryError,
    ValueError, error_chain_message,
};
pub use facade::ServiceLayer;
pub use gateway::{Gateway, RequestGateway, SendOptions};
pub use logging::{
    DefaultGatewayLogger, GatewayLogger, LogLevel, LogRecord, LogSink, RecordingLogSink,
    ResponseBodyTrimmingDecorator, TracingLogSink,
};
pub use mapper::{ClosureMapper, JsonBodyMapper, ResponseMapper};
pub use registry::{
    GatewayUseCase, GatewayUseCaseRegistry, RegistryConfig, RequestConfig, RequestSettings,
    SETTINGS_ENV_PREFIX, ServiceLayerSettings,
};
pub use request::{GatewayRequest, OutboundRequest, SimpleRequest};
pub use response::{DomainResponse, EndpointResponse, ErrorResponse, MappedResponse, SimpleResponse};
pub use value_object::{HttpMethod, Login, Password, StatusCode, Timeout};
