
use dosewatch_common::services::{DeliveryError, PushSender};
use dosewatch_push::PushError;
use fixtures::{payload, push_client, subscription};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_send_encrypts_and_signs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push/abc"))
        .and(header("content-encoding", "aes128gcm"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("ttl", "3600"))
        .and(header("urgency", "high"))
        .and(header_exists("authorization"))
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", "https://push.example.com/m/42"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/push/abc", server.uri());
    let result = push_client(3600)
        .send(&subscription(&endpoint), &payload())
        .await
        .unwrap();
    assert_eq!(result.id, "https://push.example.com/m/42");
    assert_eq!(result.status, "201");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    let plaintext = serde_json::to_vec(&payload()).unwrap();
    // aes128gcm header (86 bytes) + ciphertext + tag, never the plaintext
    assert!(body.len() > plaintext.len());
    assert!(!body.windows(8).any(|w| w == b"Lisinopr"));
}

#[tokio::test]
async fn test_endpoint_identifies_message_without_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let endpoint = format!("{}/push/xyz", server.uri());
    let result = push_client(60)
        .send(&subscription(&endpoint), &payload())
        .await
        .unwrap();
    assert_eq!(result.id, endpoint);
}

#[tokio::test]
async fn test_gone_subscription() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let endpoint = format!("{}/push/expired", server.uri());
    let err = push_client(60)
        .send(&subscription(&endpoint), &payload())
        .await
        .unwrap_err();
    assert!(matches!(err, PushError::Gone(410)));

    let delivery = push_client(60)
        .send_push(&subscription(&endpoint), &payload())
        .await
        .unwrap_err();
    assert_eq!(delivery, DeliveryError::Gone { status: 410 });
}

#[tokio::test]
async fn test_not_found_is_gone_too() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let endpoint = format!("{}/push/unknown", server.uri());
    let err = push_client(60)
        .send_push(&subscription(&endpoint), &payload())
        .await
        .unwrap_err();
    assert!(err.is_gone());
}

#[tokio::test]
async fn test_server_error_is_rejected_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let endpoint = format!("{}/push/abc", server.uri());
    let err = push_client(60)
        .send_push(&subscription(&endpoint), &payload())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DeliveryError::Rejected {
            status: 500,
            message: "upstream exploded".into()
        }
    );
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let err = push_client(60)
        .send_push(&subscription("http://127.0.0.1:9/push/abc"), &payload())
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}
