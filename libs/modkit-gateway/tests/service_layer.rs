#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the gateway stack against a live mock endpoint
//!
//! Covers the facade, the gateway with its logger, the caching proxy and the
//! settings-driven registry over a real `HyperAdapter`.

use std::io::Write;
use std::sync::Arc;

use http::{HeaderMap, HeaderValue, Uri};
use httpmock::prelude::*;
use serde_json::json;

use modkit_gateway::{
    AdapterConfig, DefaultGatewayLogger, DomainResponse, Gateway, GatewayCachingProxy,
    GatewayRequest, GatewayUseCaseRegistry, HttpMethod, HyperAdapter, InMemoryCacheStore,
    JsonBodyMapper, LogLevel, MessageBody, RecordingLogSink, RequestGateway,
    ResponseBodyTrimmingDecorator, SendOptions, ServiceLayerSettings, SimpleRequest,
};

/// Token exchange whose secret must never reach the log
struct TokenRequest {
    uri: Uri,
}

impl GatewayRequest for TokenRequest {
    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn uri(&self) -> Uri {
        self.uri.clone()
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("s3cr3t"));
        headers
    }

    fn body(&self) -> Option<MessageBody> {
        Some(MessageBody::from(r#"{"client_secret":"s3cr3t"}"#))
    }

    fn censored_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("***"));
        headers
    }

    fn censored_body(&self) -> Option<MessageBody> {
        Some(MessageBody::from(r#"{"client_secret":"***"}"#))
    }
}

fn recording_gateway(adapter: HyperAdapter) -> (Arc<RecordingLogSink>, Arc<Gateway>) {
    let sink = Arc::new(RecordingLogSink::new());
    let logger = Arc::new(DefaultGatewayLogger::new(sink.clone()));
    (sink, Arc::new(Gateway::new(Arc::new(adapter), logger)))
}

#[tokio::test]
async fn censored_request_data_is_logged_while_real_data_is_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .header("x-api-key", "s3cr3t")
            .body(r#"{"client_secret":"s3cr3t"}"#);
        then.status(200).body(r#"{"access_token":"abc"}"#);
    });

    let (sink, gateway) = recording_gateway(HyperAdapter::default());
    let request = TokenRequest {
        uri: server.url("/token").parse().unwrap(),
    };

    let response = gateway
        .send_request(&request, SendOptions::new())
        .await
        .unwrap();

    mock.assert();
    assert!(response.is_successful());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.level, LogLevel::Info);
    assert_eq!(record.message, format!("POST: {}", server.url("/token")));
    assert_eq!(record.context["request"]["headers"]["x-api-key"][0], "***");
    assert_eq!(record.context["request"]["body"], r#"{"client_secret":"***"}"#);
    assert_eq!(record.context["response"]["http_code"], "200");
    assert_eq!(record.context["response"]["body"], r#"{"access_token":"abc"}"#);
    assert!(!record.context.to_string().contains("s3cr3t"));
}

#[tokio::test]
async fn trimming_decorator_hides_body_from_log_only() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/report");
        then.status(200).body("a very large report");
    });

    let sink = Arc::new(RecordingLogSink::new());
    let logger = Arc::new(ResponseBodyTrimmingDecorator::new(DefaultGatewayLogger::new(
        sink.clone(),
    )));
    let gateway = Gateway::new(Arc::new(HyperAdapter::default()), logger);
    let request = SimpleRequest::parse(HttpMethod::Get, &server.url("/report"), None).unwrap();

    let response = gateway
        .send_request(&request, SendOptions::new())
        .await
        .unwrap();

    assert_eq!(response.body_text(), "a very large report");
    assert_eq!(
        sink.records()[0].context["response"]["body"],
        "Body was trimmed by ServiceLayer library"
    );
}

#[tokio::test]
async fn caching_proxy_serves_repeated_request_without_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/search").body(r#"{"q":"rust"}"#);
        then.status(200).body(r#"{"hits":3}"#);
    });

    let (sink, gateway) = recording_gateway(HyperAdapter::default());
    let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), gateway);
    let request = SimpleRequest::parse(
        HttpMethod::Post,
        &server.url("/search"),
        Some(MessageBody::from(r#"{"q":"rust"}"#)),
    )
    .unwrap();

    let first = proxy
        .send_request(&request, SendOptions::new().with_mapper(&JsonBodyMapper))
        .await
        .unwrap();
    let second = proxy
        .send_request(&request, SendOptions::new().with_mapper(&JsonBodyMapper))
        .await
        .unwrap();

    mock.assert_hits(1);
    assert_eq!(first, second);
    assert_eq!(second.as_mapped().unwrap().body(), &json!({"hits": 3}));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn caching_proxy_does_not_cache_error_statuses() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/flaky");
        then.status(503).body("unavailable");
    });

    let (_sink, gateway) = recording_gateway(HyperAdapter::default());
    let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), gateway);
    let request = SimpleRequest::parse(HttpMethod::Get, &server.url("/flaky"), None).unwrap();

    for _ in 0..2 {
        let response = proxy
            .send_request(&request, SendOptions::new())
            .await
            .unwrap();
        assert!(!response.is_successful());
    }

    mock.assert_hits(2);
}

#[tokio::test]
async fn cache_hit_consumes_pending_one_time_logger() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/users");
        then.status(200).body("Success response");
    });

    let (default_sink, gateway) = recording_gateway(HyperAdapter::default());
    let proxy = GatewayCachingProxy::new(Arc::new(InMemoryCacheStore::default()), gateway);
    let request = SimpleRequest::parse(HttpMethod::Get, &server.url("/users"), None).unwrap();

    proxy
        .send_request(&request, SendOptions::new())
        .await
        .unwrap();

    let one_time_sink = Arc::new(RecordingLogSink::new());
    proxy.use_logger(Arc::new(DefaultGatewayLogger::new(one_time_sink.clone())));
    let cached = proxy
        .send_request(&request, SendOptions::new())
        .await
        .unwrap();

    let other = SimpleRequest::parse(HttpMethod::Get, &server.url("/users?page=2"), None).unwrap();
    proxy
        .send_request(&other, SendOptions::new())
        .await
        .unwrap();

    assert_eq!(cached.body_text(), "Success response");
    assert!(one_time_sink.is_empty());
    assert_eq!(default_sink.len(), 2);
}

#[tokio::test]
async fn registry_from_settings_sends_configured_requests() {
    let server = MockServer::start();
    let users = server.mock(|when, then| {
        when.method(GET)
            .path("/users")
            .header("accept", "application/json");
        then.status(200).body(r#"[{"id":1}]"#);
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/users")
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .body(r#"{"name":"Ada"}"#);
        then.status(201).body(r#"{"id":2}"#);
    });

    let yaml = format!(
        r#"
adapter:
  timeout: 5.0
  headers:
    Accept: application/json
requests:
  list_users:
    method: GET
    uri: {base}/users
  create_user:
    method: POST
    uri: {base}/users
    headers:
      Content-Type: application/json
    body: '{{"name":"Ada"}}'
"#,
        base = server.base_url()
    );
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let settings = ServiceLayerSettings::load(file.path()).unwrap();
    let (_sink, gateway) = recording_gateway(HyperAdapter::default());
    let registry = GatewayUseCaseRegistry::from_settings(gateway, &settings).unwrap();

    let listed = registry.process_use_case("list_users").await.unwrap();
    let created = registry.process_use_case("create_user").await.unwrap();

    users.assert();
    create.assert();
    assert_eq!(listed.body_text(), r#"[{"id":1}]"#);
    assert!(matches!(created, DomainResponse::Simple(ref r) if r.status().as_u16() == 201));
}

#[tokio::test]
async fn adapter_config_timeout_becomes_error_response() {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200).delay(std::time::Duration::from_secs(2));
    });

    let config = AdapterConfig::from_value(json!({ "timeout": 0.2 })).unwrap();
    let (sink, gateway) = recording_gateway(HyperAdapter::new(config));
    let request = SimpleRequest::parse(HttpMethod::Get, &server.url("/slow"), None).unwrap();

    let response = gateway
        .send_request(&request, SendOptions::new())
        .await
        .unwrap();

    assert!(response.as_error().is_some());
    assert!(response.body_text().contains("timed out"));
    assert_eq!(sink.records()[0].level, LogLevel::Critical);
}
