//! Response caching in front of a gateway

mod policy;
mod proxy;
mod store;

pub use policy::{CacheKeyDerivation, CachePolicy, DefaultCachePolicy};
pub use proxy::GatewayCachingProxy;
pub use store::{CacheStore, DEFAULT_CACHE_CAPACITY, InMemoryCacheStore};
