//! Transport adapters
//!
//! An adapter turns an [`OutboundRequest`] into a real HTTP exchange. Any
//! response that arrives, whatever its status, is an `Ok`
//! [`EndpointResponse`]; only exchanges that produced no response fail.

mod hyper_adapter;
mod redirect;
mod tls;

use async_trait::async_trait;

use crate::config::AdapterConfig;
use crate::error::AdapterError;
use crate::request::OutboundRequest;
use crate::response::EndpointResponse;

pub use hyper_adapter::HyperAdapter;
pub use redirect::RedirectPolicy;

#[async_trait]
pub trait Adapter: Send + Sync {
    /// Send `request`, with `config_override` merged over the adapter's
    /// own config for this call only
    ///
    /// # Errors
    /// Returns [`AdapterError`] when no response was received.
    async fn send(
        &self,
        request: &OutboundRequest,
        config_override: Option<&AdapterConfig>,
    ) -> Result<EndpointResponse, AdapterError>;
}
