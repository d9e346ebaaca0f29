use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use crate::error::CacheError;

/// Entries kept by [`InMemoryCacheStore::default`]
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Key-value store holding serialized responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// # Errors
    /// Returns [`CacheError`] if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// # Errors
    /// Returns [`CacheError`] if the backend cannot be read.
    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Store `value`; `ttl` of `None` keeps it until evicted
    ///
    /// # Errors
    /// Returns [`CacheError`] if the backend cannot be written.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
}

/// Expiry driven by the TTL stored with each entry
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Bounded in-process store backed by a moka cache
#[derive(Clone)]
pub struct InMemoryCacheStore {
    cache: Cache<String, Entry>,
}

impl InMemoryCacheStore {
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.cache.insert(key.to_owned(), Entry { value, ttl }).await;
        Ok(())
    }
}
