use std::time::Duration;

use orion_core::signature::SignatureCodec;
use orion_core::webhook::{
    DeliveryOutcome, SubscriptionRegistry, WebhookDispatcher, IDEMPOTENCY_HEADER,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn header_text(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

async fn mount_hook(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fanout_shares_key_and_signature_across_endpoints() {
    let server = MockServer::start().await;
    mount_hook(&server, "/a", 200).await;
    mount_hook(&server, "/b", 500).await;
    mount_hook(&server, "/c", 202).await;

    let mut registry = SubscriptionRegistry::new();
    for route in ["/a", "/b", "/c"] {
        registry.subscribe("#ops", Url::parse(&format!("{}{route}", server.uri())).unwrap());
    }
    let codec = SignatureCodec::new("whsec_test").unwrap();
    let dispatcher = WebhookDispatcher::new(registry, Duration::from_secs(5))
        .unwrap()
        .with_signing(codec.clone());

    let payload = json!({ "phase": "running", "step_id": "step_1" });
    let report = dispatcher.fanout("#ops", &payload).await;

    assert_eq!(report.deliveries.len(), 3);
    assert_eq!(report.delivered(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report
        .deliveries
        .iter()
        .any(|d| d.outcome == DeliveryOutcome::Rejected { status: 500 }));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);

    let key = report.idempotency_key.unwrap().to_string();
    let signature = header_text(&received[0], SIGNATURE_HEADER).unwrap();
    let timestamp = header_text(&received[0], TIMESTAMP_HEADER).unwrap();
    for request in &received {
        assert_eq!(header_text(request, IDEMPOTENCY_HEADER).as_deref(), Some(key.as_str()));
        assert_eq!(header_text(request, SIGNATURE_HEADER).as_deref(), Some(signature.as_str()));
        assert_eq!(header_text(request, TIMESTAMP_HEADER).as_deref(), Some(timestamp.as_str()));
        assert_eq!(
            header_text(request, "content-type").as_deref(),
            Some("application/json")
        );
        assert_eq!(request.body, received[0].body);
    }

    // Receivers can verify the exact bytes they were sent.
    let ts: i64 = timestamp.parse().unwrap();
    assert!(codec.verify(ts, &received[0].body, &signature, ts).is_ok());
}

#[tokio::test]
async fn test_unknown_channel_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut registry = SubscriptionRegistry::new();
    registry.subscribe("#ops", Url::parse(&server.uri()).unwrap());
    let dispatcher = WebhookDispatcher::new(registry, Duration::from_secs(5)).unwrap();

    let report = dispatcher.fanout("#nobody", &json!({ "text": "hi" })).await;

    assert!(report.is_noop());
    assert!(report.idempotency_key.is_none());
}

#[tokio::test]
async fn test_unsigned_dispatcher_omits_signature_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists(IDEMPOTENCY_HEADER))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut registry = SubscriptionRegistry::new();
    registry.subscribe("#ops", Url::parse(&server.uri()).unwrap());
    let dispatcher = WebhookDispatcher::new(registry, Duration::from_secs(5)).unwrap();
    assert!(!dispatcher.is_signing());

    let report = dispatcher.fanout("#ops", &json!({ "text": "hi" })).await;
    assert_eq!(report.delivered(), 1);

    let received = server.received_requests().await.unwrap();
    assert!(header_text(&received[0], SIGNATURE_HEADER).is_none());
    assert!(header_text(&received[0], TIMESTAMP_HEADER).is_none());
}

#[tokio::test]
async fn test_unreachable_endpoint_does_not_block_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut registry = SubscriptionRegistry::new();
    registry.subscribe("#ops", Url::parse(&server.uri()).unwrap());
    registry.subscribe("#ops", Url::parse("http://127.0.0.1:9/hook").unwrap());
    let dispatcher = WebhookDispatcher::new(registry, Duration::from_secs(5)).unwrap();

    let report = dispatcher.fanout("#ops", &json!({ "text": "hi" })).await;

    assert_eq!(report.delivered(), 1);
    assert!(report
        .deliveries
        .iter()
        .any(|d| matches!(d.outcome, DeliveryOutcome::Unreachable { .. })));
}

#[tokio::test]
async fn test_redelivery_reuses_broadcast() {
    let server = MockServer::start().await;
    mount_hook(&server, "/a", 200).await;

    let mut registry = SubscriptionRegistry::new();
    registry.subscribe("#ops", Url::parse(&format!("{}/a", server.uri())).unwrap());
    let codec = SignatureCodec::new("whsec_test").unwrap();
    let dispatcher = WebhookDispatcher::new(registry, Duration::from_secs(5))
        .unwrap()
        .with_signing(codec.clone());

    let broadcast =
        orion_core::webhook::Broadcast::new(&json!({ "n": 1 }), Some(&codec), 1_760_000_000).unwrap();
    let first = dispatcher.deliver("#ops", &broadcast).await;
    let second = dispatcher.deliver("#ops", &broadcast).await;

    assert_eq!(first.idempotency_key, second.idempotency_key);
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(
        header_text(&received[0], IDEMPOTENCY_HEADER),
        header_text(&received[1], IDEMPOTENCY_HEADER)
    );
    assert_eq!(
        header_text(&received[1], TIMESTAMP_HEADER).as_deref(),
        Some("1760000000")
    );
}
