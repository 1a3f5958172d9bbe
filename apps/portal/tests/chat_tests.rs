//! Integration tests for the completion client and chat panel

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use studyhub_portal::chat::{ChatAssistant, ChatPanel, CompletionClient, Sender};
use studyhub_shared::constants::CHAT_ERROR_REPLY;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn completion_client(base: &str, key: &str) -> CompletionClient {
    CompletionClient::new(
        base,
        key,
        "llama-3.3-70b-versatile",
        Duration::from_secs(5),
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn test_completion_sends_single_user_turn_with_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "llama-3.3-70b-versatile",
            "messages": [{ "role": "user", "content": "Explain Big-O" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "It bounds growth." } }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = completion_client(&format!("{}/v1", mock_server.uri()), "sk-test");
    let reply = client.complete("Explain Big-O").await.unwrap();
    assert_eq!(reply, "It bounds growth.");
}

#[tokio::test]
async fn test_completion_error_envelope_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API Key", "type": "invalid_request_error" }
        })))
        .mount(&mock_server)
        .await;

    let err = completion_client(&mock_server.uri(), "bad")
        .complete("hi")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Invalid API Key");
}

#[tokio::test]
async fn test_completion_without_choices_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let result = completion_client(&mock_server.uri(), "").complete("hi").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_panel_records_service_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello, Jane!" } }]
        })))
        .mount(&mock_server)
        .await;

    let panel = ChatPanel::new(Arc::new(completion_client(&mock_server.uri(), "k")));
    assert!(panel.send("hi").await);
    let entries = panel.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].text, "Hello, Jane!");
}

#[tokio::test]
async fn test_network_failure_yields_exactly_one_error_entry() {
    let panel = ChatPanel::new(Arc::new(completion_client("http://127.0.0.1:1", "k")));
    assert!(panel.send("hello").await);

    let entries = panel.entries();
    let assistant: Vec<_> = entries
        .iter()
        .filter(|e| e.sender == Sender::Assistant)
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sender, Sender::User);
    assert_eq!(entries[0].text, "hello");
    assert_eq!(assistant.len(), 1);
    assert_eq!(assistant[0].text, CHAT_ERROR_REPLY);
    assert!(!panel.is_awaiting());
}

#[tokio::test]
async fn test_server_error_yields_error_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let panel = ChatPanel::new(Arc::new(completion_client(&mock_server.uri(), "k")));
    panel.send("hello").await;
    assert_eq!(panel.entries().last().unwrap().text, CHAT_ERROR_REPLY);
}
