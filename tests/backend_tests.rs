use tern::api::client::{BackendError, ChatBackend, DeepSeekClient};
use tern::core::conversation::{Role, Turn};
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a one-turn conversation with a user message
fn test_turns() -> Vec<Turn> {
    vec![Turn {
        role: Role::User,
        content: "Hello".to_string(),
    }]
}

/// Collects all buffered fragments from a finished stream
async fn collect_fragments(mut receiver: mpsc::Receiver<String>) -> Vec<String> {
    let mut fragments = Vec::new();
    while let Some(fragment) = receiver.recv().await {
        fragments.push(fragment);
    }
    fragments
}

// ============================================================================
// Non-streaming Tests
// ============================================================================

#[tokio::test]
async fn test_send_returns_reply_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-chat",
            "stream": false,
            "messages": [{"role": "user", "content": "Hello"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hi there"}}
            ],
        })))
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());
    let reply = client.send(&test_turns(), "deepseek-chat").await;

    assert_eq!(reply.unwrap(), "hi there");
}

#[tokio::test]
async fn test_send_maps_http_error_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("bad-key".to_string(), mock_server.uri());
    let result = client.send(&test_turns(), "deepseek-chat").await;

    match result {
        Err(BackendError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_rejects_empty_choices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
        )
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());
    let result = client.send(&test_turns(), "deepseek-chat").await;

    assert!(matches!(result, Err(BackendError::Parse(_))));
}

// ============================================================================
// Streaming Tests
// ============================================================================

#[tokio::test]
async fn test_stream_delivers_fragments_in_order_until_done() {
    let mock_server = MockServer::start().await;

    // Role-only first chunk, a malformed line, then content, the end
    // marker, and a fragment after it that must never be delivered.
    let sse_response = "\
data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}

data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}

data: this is not json

data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}

data: [DONE]

data: {\"choices\":[{\"delta\":{\"content\":\"after done\"}}]}
";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());

    let (tx, rx) = mpsc::channel(100);
    let result = client.send_stream(&test_turns(), "deepseek-chat", tx).await;

    assert!(result.is_ok());
    let fragments = collect_fragments(rx).await;
    assert_eq!(fragments, vec!["Hello", " world"]);
}

#[tokio::test]
async fn test_stream_without_done_marker_still_succeeds() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}
";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());

    let (tx, rx) = mpsc::channel(100);
    let result = client.send_stream(&test_turns(), "deepseek-chat", tx).await;

    assert!(result.is_ok());
    assert_eq!(collect_fragments(rx).await, vec!["partial"]);
}

#[tokio::test]
async fn test_stream_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());

    let (tx, _rx) = mpsc::channel(100);
    let result = client.send_stream(&test_turns(), "deepseek-chat", tx).await;

    assert!(matches!(result, Err(BackendError::Api { status: 500, .. })));
}

#[tokio::test]
async fn test_stream_channel_closed_error() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());

    let (tx, rx) = mpsc::channel(1);
    // Drop receiver immediately to simulate channel closed
    drop(rx);

    let result = client.send_stream(&test_turns(), "deepseek-chat", tx).await;

    assert!(matches!(result, Err(BackendError::ChannelClosed)));
}

// ============================================================================
// Conversation round-trip
// ============================================================================

#[tokio::test]
async fn test_send_carries_full_conversation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "hi there"},
                {"role": "user", "content": "and again"},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "twice now"}}
            ],
        })))
        .mount(&mock_server)
        .await;

    let turns = vec![
        Turn {
            role: Role::User,
            content: "Hello".to_string(),
        },
        Turn {
            role: Role::Assistant,
            content: "hi there".to_string(),
        },
        Turn {
            role: Role::User,
            content: "and again".to_string(),
        },
    ];

    let client = DeepSeekClient::new("test-key".to_string(), mock_server.uri());
    let reply = client.send(&turns, "deepseek-coder").await;

    assert_eq!(reply.unwrap(), "twice now");
}
