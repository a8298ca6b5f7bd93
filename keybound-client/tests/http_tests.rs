#![cfg(feature = "online")]

use keybound_client::{HttpTransport, HttpTransportConfig, TransportError, ValidationRequest, ValidationTransport};
use keybound_license::resolver::RemoteStatus;
use keybound_types::LicenseKey;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn key() -> LicenseKey {
    LicenseKey::new("KEY-0001").unwrap()
}

fn transport_for(server: &MockServer, token: Option<&str>) -> HttpTransport {
    HttpTransport::new(HttpTransportConfig {
        base_url: server.uri(),
        api_token: token.map(str::to_string),
        timeout: std::time::Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn parses_successful_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/licenses/validate"))
        .and(body_partial_json(serde_json::json!({
            "license_key": "KEY-0001"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "active",
            "capabilities": ["updates"],
            "ttl": 300
        })))
        .mount(&server)
        .await;

    let transport = transport_for(&server, None);
    let response = transport
        .validate(&key(), &ValidationRequest::default())
        .await
        .unwrap();

    assert_eq!(response.status, RemoteStatus::Active);
    assert_eq!(response.capabilities, vec!["updates".to_string()]);
    assert_eq!(response.ttl, Some(300));
}

#[tokio::test]
async fn sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/licenses/validate"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "active"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server, Some("secret-token"));
    transport
        .validate(&key(), &ValidationRequest::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn http_error_is_a_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/licenses/validate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("license not found"))
        .mount(&server)
        .await;

    let transport = transport_for(&server, None);
    let result = transport
        .validate(&key(), &ValidationRequest::default())
        .await;

    match result {
        Err(TransportError::Remote { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "license not found");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_success_body_is_a_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/licenses/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let transport = transport_for(&server, None);
    let result = transport
        .validate(&key(), &ValidationRequest::default())
        .await;
    assert!(matches!(result, Err(TransportError::Remote { status: 200, .. })));
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    // Nothing listens on this port.
    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_token: None,
        timeout: std::time::Duration::from_secs(2),
    })
    .unwrap();

    let result = transport
        .validate(&key(), &ValidationRequest::default())
        .await;
    assert!(matches!(result, Err(TransportError::Network(_))));
}
