//! Integration tests for the chat session orchestrator
//!
//! A wiremock server stands in for the remote providers, so the full
//! submit cycle (state transitions, request building, response parsing,
//! fallback policy) runs end to end without the network.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banter::chat::{ChatSession, Conversation, GatewayBackend, GeminiBackend, Speaker};
use banter::config::{ChatConfig, GatewayConfig, GeminiConfig};

// =============================================================================
// Test Fixtures
// =============================================================================

fn gateway_session(api_url: String) -> ChatSession {
    let config = GatewayConfig {
        api_url,
        model: "test-model".to_string(),
        api_key_env: "UNUSED".to_string(),
        timeout_secs: 5,
    };
    let chat = ChatConfig::default();
    let backend = GatewayBackend::new(&config, &chat, "test-token".to_string()).unwrap();
    ChatSession::new(&chat, Some(Box::new(backend)))
}

fn gemini_session(api_url: String) -> ChatSession {
    let config = GeminiConfig {
        api_url,
        model: "gemini-1.5-flash-latest".to_string(),
        api_key_env: "UNUSED".to_string(),
        timeout_secs: 5,
    };
    let backend = GeminiBackend::new(&config, "test-key".to_string()).unwrap();
    ChatSession::new(&ChatConfig::default(), Some(Box::new(backend)))
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

// =============================================================================
// Response cycle invariants
// =============================================================================

#[tokio::test]
async fn test_submit_appends_user_then_assistant_with_adjacent_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello back")))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("hello out there").await;

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1].speaker, Speaker::User);
    assert_eq!(turns[1].text, "hello out there");
    assert_eq!(turns[2].speaker, Speaker::Assistant);
    assert_eq!(turns[2].text, "hello back");
    assert_eq!(turns[2].id, turns[1].id + 1);
    assert!(!session.is_awaiting());
}

#[tokio::test]
async fn test_ids_keep_increasing_across_rounds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("reply")))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("round one").await;
    session.submit("round two").await;

    let ids: Vec<u64> = session.conversation().turns().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_prior_turns_are_sent_as_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("first reply")))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    // The second request must carry the first exchange in its messages.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system"},
                {"role": "assistant"},
                {"role": "user", "content": "first question"},
                {"role": "assistant", "content": "first reply"},
                {"role": "user", "content": "second question"},
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("second reply")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("first question").await;
    session.submit("second question").await;

    assert_eq!(
        session.conversation().turns().last().unwrap().text,
        "second reply"
    );
}

#[test]
fn test_submission_while_awaiting_is_rejected() {
    let mut convo = Conversation::new("greeting");
    convo.begin_exchange("in flight").unwrap();

    // The awaiting flag is the only guard against pipelining; a second
    // submission must leave the conversation untouched.
    assert!(convo.begin_exchange("should be ignored").is_none());
    assert_eq!(convo.turns().len(), 2);
    assert!(convo.is_awaiting());

    convo.complete_exchange("done");
    assert_eq!(convo.begin_exchange("accepted again"), Some(4));
}

#[tokio::test]
async fn test_reset_returns_to_single_greeting_turn() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("reply")))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("one").await;
    session.submit("two").await;

    session.reset();

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].id, 1);
    assert_eq!(turns[0].speaker, Speaker::Assistant);
    assert!(!session.is_awaiting());
}

// =============================================================================
// Degraded paths
// =============================================================================

#[tokio::test]
async fn test_no_credential_mode_answers_without_network() {
    let mut session = ChatSession::new(&ChatConfig::default(), None);
    session.submit("hi").await;

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].speaker, Speaker::Assistant);
    assert!(turns[2].text.starts_with("Hello! I'm Banter"));
}

#[tokio::test]
async fn test_gateway_503_surfaces_model_loading_diagnostic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("is anyone home").await;

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 3);
    assert!(turns[2].text.starts_with("\u{26a0}\u{fe0f}"));
    assert!(turns[2].text.contains("loading"));
    assert!(!session.is_awaiting());
}

#[tokio::test]
async fn test_gateway_error_diagnostic_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("a question").await;

    let last = session.conversation().turns().last().unwrap();
    assert!(last.text.starts_with("\u{26a0}\u{fe0f}"));
    assert!(last.text.contains("500"));
    assert!(last.text.contains("backend exploded"));
}

#[tokio::test]
async fn test_empty_completion_falls_back_to_local_responder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("")))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("random xyz query").await;

    let last = session.conversation().turns().last().unwrap();
    // Content-level fallback: canned reply, no warning marker.
    assert!(last.text.contains("random xyz query"));
    assert!(!last.text.starts_with("\u{26a0}\u{fe0f}"));
}

#[tokio::test]
async fn test_unparseable_completion_falls_back_to_local_responder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let mut session = gateway_session(mock_server.uri());
    session.submit("thanks a lot").await;

    let last = session.conversation().turns().last().unwrap();
    assert!(last.text.contains("You're welcome"));
}

#[tokio::test]
async fn test_unreachable_backend_yields_connection_diagnostic() {
    // Nothing listens on port 1.
    let mut session = gateway_session("http://127.0.0.1:1".to_string());
    session.submit("a question").await;

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 3);
    assert!(turns[2].text.starts_with("\u{26a0}\u{fe0f}"));
    assert!(turns[2].text.contains("connection error"));
    assert!(!session.is_awaiting());
}

// =============================================================================
// Direct mode
// =============================================================================

#[tokio::test]
async fn test_direct_mode_round_trip() {
    let mock_server = MockServer::start().await;

    let response_body = serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": "Direct answer."}]
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash-latest:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [
                {"role": "model"},
                {"role": "user", "parts": [{"text": "a question"}]},
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
        .mount(&mock_server)
        .await;

    let mut session = gemini_session(mock_server.uri());
    session.submit("a question").await;

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].text, "Direct answer.");
}

#[tokio::test]
async fn test_direct_mode_error_is_diagnostic_turn() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
        .mount(&mock_server)
        .await;

    let mut session = gemini_session(mock_server.uri());
    session.submit("a question").await;

    let last = session.conversation().turns().last().unwrap();
    assert!(last.text.starts_with("\u{26a0}\u{fe0f}"));
    assert!(last.text.contains("403"));
}
