use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::Adapter;
use crate::cache::policy::{CachePolicy, DefaultCachePolicy};
use crate::cache::store::CacheStore;
use crate::error::{CacheError, GatewayError};
use crate::gateway::{RequestGateway, SendOptions};
use crate::logging::GatewayLogger;
use crate::request::GatewayRequest;
use crate::response::DomainResponse;

/// [`RequestGateway`] decorator serving repeated requests from a store
///
/// A hit never reaches the inner gateway, so pending one-time overrides are
/// dropped explicitly to keep their next-call-only lifetime. Store failures
/// and unreadable entries are logged and treated as misses.
pub struct GatewayCachingProxy {
    store: Arc<dyn CacheStore>,
    inner: Arc<dyn RequestGateway>,
    policy: Arc<dyn CachePolicy>,
}

impl GatewayCachingProxy {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, inner: Arc<dyn RequestGateway>) -> Self {
        Self::with_policy(store, inner, Arc::new(DefaultCachePolicy::new()))
    }

    #[must_use]
    pub fn with_policy(
        store: Arc<dyn CacheStore>,
        inner: Arc<dyn RequestGateway>,
        policy: Arc<dyn CachePolicy>,
    ) -> Self {
        Self {
            store,
            inner,
            policy,
        }
    }

    async fn lookup(&self, key: &str) -> Result<Option<DomainResponse>, CacheError> {
        let Some(entry) = self.store.get(key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&entry)?))
    }

    async fn save(
        &self,
        key: &str,
        response: &DomainResponse,
        ttl: Option<std::time::Duration>,
    ) -> Result<(), CacheError> {
        let entry = serde_json::to_string(response)?;
        self.store.set(key, entry, ttl).await
    }
}

#[async_trait]
impl RequestGateway for GatewayCachingProxy {
    fn via_adapter(&self, adapter: Arc<dyn Adapter>) {
        self.inner.via_adapter(adapter);
    }

    fn use_logger(&self, logger: Arc<dyn GatewayLogger>) {
        self.inner.use_logger(logger);
    }

    fn reset_one_time_overrides(&self) {
        self.inner.reset_one_time_overrides();
    }

    async fn send_request(
        &self,
        request: &dyn GatewayRequest,
        options: SendOptions<'_>,
    ) -> Result<DomainResponse, GatewayError> {
        let outbound = request.to_outbound();
        let key = self.policy.cache_key(&outbound);

        match self.lookup(&key).await {
            Ok(Some(response)) => {
                tracing::debug!(key = %key, uri = %request.censored_uri(), "Serving response from cache");
                self.inner.reset_one_time_overrides();
                return Ok(response);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Cache lookup failed, sending request");
            }
        }

        let response = self.inner.send_request(request, options).await?;
        if self.policy.should_cache(&outbound, &response)
            && let Err(err) = self
                .save(&key, &response, self.policy.ttl(&outbound))
                .await
        {
            tracing::warn!(key = %key, error = %err, "Failed to store response in cache");
        }
        Ok(response)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::cache::store::InMemoryCacheStore;
    use crate::request::SimpleRequest;
    use crate::response::{ErrorResponse, MappedResponse, SimpleResponse};
    use crate::value_object::{HttpMethod, StatusCode};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Inner gateway returning queued responses and counting sends
    struct ScriptedGateway {
        responses: Mutex<Vec<DomainResponse>>,
        sends: AtomicUsize,
        resets: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<DomainResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                sends: AtomicUsize::new(0),
                resets: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RequestGateway for ScriptedGateway {
        fn via_adapter(&self, _adapter: Arc<dyn Adapter>) {}

        fn use_logger(&self, _logger: Arc<dyn GatewayLogger>) {}

        fn reset_one_time_overrides(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }

        async fn send_request(
            &self,
            _request: &dyn GatewayRequest,
            _options: SendOptions<'_>,
        ) -> Result<DomainResponse, GatewayError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses.lock().remove(0))
        }
    }

    /// Store failing every operation
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("store offline".into()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: String,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::Backend("store offline".into()))
        }
    }

    fn request(body: &'static str) -> SimpleRequest {
        SimpleRequest::parse(
            HttpMethod::Post,
            "https://api.example.com/search",
            Some(body.into()),
        )
        .unwrap()
    }

    fn ok(body: &'static str) -> DomainResponse {
        SimpleResponse::new(StatusCode::OK, body.into()).into()
    }

    #[tokio::test]
    async fn test_second_identical_request_is_served_from_cache() {
        let inner = ScriptedGateway::new(vec![ok("first"), ok("second")]);
        let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), inner.clone());

        let first = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();
        let second = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.body_text(), "first");
        assert_eq!(inner.sends.load(Ordering::SeqCst), 1);
        assert_eq!(inner.resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_body_misses() {
        let inner = ScriptedGateway::new(vec![ok("first"), ok("second")]);
        let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), inner.clone());

        proxy
            .send_request(&request("a"), SendOptions::new())
            .await
            .unwrap();
        let other = proxy
            .send_request(&request("b"), SendOptions::new())
            .await
            .unwrap();

        assert_eq!(other.body_text(), "second");
        assert_eq!(inner.sends.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let failed: DomainResponse = ErrorResponse::new("down").into();
        let not_found: DomainResponse =
            SimpleResponse::new(StatusCode::NOT_FOUND, "missing".into()).into();
        let inner = ScriptedGateway::new(vec![failed, not_found, ok("up")]);
        let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), inner.clone());

        for _ in 0..3 {
            proxy
                .send_request(&request("q"), SendOptions::new())
                .await
                .unwrap();
        }

        assert_eq!(inner.sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_mapped_response_survives_cache_round_trip() {
        let mapped: DomainResponse = MappedResponse::successful(json!({"ids": [1, 2]})).into();
        let inner = ScriptedGateway::new(vec![mapped.clone()]);
        let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), inner);

        proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();
        let cached = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();

        assert_eq!(cached, mapped);
    }

    #[tokio::test]
    async fn test_broken_store_falls_through_to_gateway() {
        let inner = ScriptedGateway::new(vec![ok("first"), ok("second")]);
        let proxy = GatewayCachingProxy::new(Arc::new(BrokenStore), inner.clone());

        let first = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();
        let second = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();

        assert_eq!(first.body_text(), "first");
        assert_eq!(second.body_text(), "second");
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_a_miss() {
        let store = Arc::new(InMemoryCacheStore::default());
        let policy = DefaultCachePolicy::new();
        let key = policy.cache_key(&request("q").to_outbound());
        store.set(&key, "not json".to_owned(), None).await.unwrap();

        let inner = ScriptedGateway::new(vec![ok("fresh")]);
        let proxy = GatewayCachingProxy::new(store, inner.clone());

        let response = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();

        assert_eq!(response.body_text(), "fresh");
        assert_eq!(inner.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entry_expires_with_policy_ttl() {
        let inner = ScriptedGateway::new(vec![ok("first"), ok("second")]);
        let policy = Arc::new(DefaultCachePolicy::new().with_ttl(Duration::from_millis(50)));
        let proxy = GatewayCachingProxy::with_policy(
            Arc::new(InMemoryCacheStore::default()),
            inner.clone(),
            policy,
        );

        proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let after_expiry = proxy
            .send_request(&request("q"), SendOptions::new())
            .await
            .unwrap();

        assert_eq!(after_expiry.body_text(), "second");
        assert_eq!(inner.sends.load(Ordering::SeqCst), 2);
    }
}
