use std::time::Duration;

use md5::{Digest, Md5};

use crate::request::OutboundRequest;
use crate::response::DomainResponse;

/// Decides what is cached, under which key, and for how long
pub trait CachePolicy: Send + Sync {
    fn cache_key(&self, request: &OutboundRequest) -> String;

    fn should_cache(&self, request: &OutboundRequest, response: &DomainResponse) -> bool;

    /// `None` keeps the entry until the store evicts it
    fn ttl(&self, request: &OutboundRequest) -> Option<Duration>;
}

/// How the request body enters the cache key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheKeyDerivation {
    /// Raw body bytes
    #[default]
    Plain,
    /// Body text encoded once more as a JSON string, with `/` and non-ASCII
    /// escaped
    ///
    /// Produces the keys written by earlier deployments of this service
    /// layer; use it only to share a store with them.
    JsonEncodedBody,
}

/// MD5 of `"{uri}-{method}-{body}"`; caches successful responses only
#[derive(Debug, Clone, Default)]
pub struct DefaultCachePolicy {
    derivation: CacheKeyDerivation,
    ttl: Option<Duration>,
}

impl DefaultCachePolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key_derivation(mut self, derivation: CacheKeyDerivation) -> Self {
        self.derivation = derivation;
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl CachePolicy for DefaultCachePolicy {
    fn cache_key(&self, request: &OutboundRequest) -> String {
        let mut hasher = Md5::new();
        hasher.update(format!("{}-{}-", request.uri(), request.method()));
        match self.derivation {
            CacheKeyDerivation::Plain => hasher.update(request.body().as_bytes()),
            CacheKeyDerivation::JsonEncodedBody => {
                hasher.update(legacy_json_string(&request.body().to_text()));
            }
        }
        hex::encode(hasher.finalize())
    }

    fn should_cache(&self, _request: &OutboundRequest, response: &DomainResponse) -> bool {
        response.is_successful()
    }

    fn ttl(&self, _request: &OutboundRequest) -> Option<Duration> {
        self.ttl
    }
}

/// JSON string literal with `/` escaped and non-ASCII written as UTF-16
/// `\uXXXX` units
fn legacy_json_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (' '..='\u{7f}').contains(&c) => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str("\\u");
                    out.push_str(&hex::encode(unit.to_be_bytes()));
                }
            }
        }
    }
    out.push('"');
    out
}
