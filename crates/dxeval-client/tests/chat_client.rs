//! Integration tests for ChatClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover session creation, message
//! sending, status mapping (404/429/5xx), and retry behavior.

use std::time::Duration;

use dxeval_client::{ChatBackend, ChatClient, ChatError, ChatReply, ClientConfig, SessionId};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(mock_server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_url(mock_server.uri())
        .with_credentials("test-key", "bot-7")
        .with_backoff_base(Duration::from_millis(1))
}

fn create_test_client(mock_server: &MockServer) -> ChatClient {
    ChatClient::new(test_config(mock_server)).expect("failed to create client")
}

#[tokio::test]
async fn test_create_session_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(
            json!({"botId": "bot-7", "user": null, "initialMessages": null}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "sess-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let session = client.create_session().await.expect("session failed");

    assert_eq!(session, SessionId("sess-1".to_string()));
}

#[tokio::test]
async fn test_send_message_normalizes_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session/sess-1/message"))
        .and(body_json(
            json!({"message": {"content": "Patient Symptoms: fever", "type": "USER"}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg-9",
            "content": "  Most likely: influenza  "
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let response = client
        .send_message(&SessionId("sess-1".into()), "Patient Symptoms: fever")
        .await
        .expect("send failed");

    assert_eq!(
        response.reply,
        ChatReply::Content("Most likely: influenza".to_string())
    );
    assert_eq!(response.raw["id"], "msg-9");
}

#[tokio::test]
async fn test_retry_on_5xx_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session/s/message"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session/s/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let response = client
        .send_message(&SessionId("s".into()), "hi")
        .await
        .expect("should succeed after three 500s");

    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_not_found_fails_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session/missing/message"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.send_message(&SessionId("missing".into()), "hi").await;

    match result {
        Err(ChatError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such session");
        }
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server).with_max_retries(2);
    let client = ChatClient::new(config).unwrap();
    let result = client.create_session().await;

    match result {
        Err(e @ ChatError::RateLimited { .. }) => {
            assert_eq!(e.status(), Some(429));
            assert_eq!(e.body(), Some("slow down"));
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_session_create_retries_on_503() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "after-503"})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let session = client.create_session().await.expect("should recover");
    assert_eq!(session.as_str(), "after-503");
}

#[tokio::test]
async fn test_non_json_success_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/session"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.create_session().await;

    assert!(matches!(result, Err(ChatError::InvalidResponse { .. })));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1 of the loopback interface.
    let uri = "http://127.0.0.1:1";

    let config = ClientConfig::default()
        .with_url(uri)
        .with_credentials("k", "b")
        .with_max_retries(1)
        .with_backoff_base(Duration::from_millis(1));
    let client = ChatClient::new(config).unwrap();

    let result = client.create_session().await;
    assert!(matches!(result, Err(ChatError::Network { .. })));
}
