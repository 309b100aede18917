//! Integration tests for the exchange reducer using wiremock.

use std::time::Duration;

use gemini_chat_core::{
    ChatConfig, ErrorKind, ExchangeOutcome, ExchangeReducer, ExchangeState, GeminiClient, Role,
    Turn, TurnStore, DECODE_ERROR_REPLY, PLACEHOLDER_REPLY,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn reducer_for(base_url: &str) -> ExchangeReducer {
    reducer_with_key(base_url, "test-api-key")
}

fn reducer_with_key(base_url: &str, api_key: &str) -> ExchangeReducer {
    let config = ChatConfig {
        api_key: Some(api_key.to_string()),
        base_url: Some(base_url.to_string()),
        timeout_secs: Some(1),
        ..ChatConfig::default()
    };
    ExchangeReducer::new(GeminiClient::new(config).unwrap())
}

fn reply_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [ { "text": text } ] },
            "finishReason": "STOP"
        }]
    })
}

async fn mount_body(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sends_key_and_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "contents": [ { "role": "user", "parts": [ { "text": "Hello" } ] } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(outcome.state, ExchangeState::Rendered);
    assert!(outcome.notice.is_none());
    assert_eq!(outcome.reply_text(), "Hi there");
    assert_eq!(store.all()[1], Turn::assistant("Hi there"));
}

#[tokio::test]
async fn n_exchanges_leave_2n_alternating_turns() {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(200).set_body_json(reply_body("ack"))).await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let utterances = ["one", "two", "three", "four"];
    for utterance in utterances {
        reducer.handle_user_turn(&mut store, utterance).await;
    }

    assert_eq!(store.len(), 2 * utterances.len());
    for (i, turn) in store.all().iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(turn.role, Role::User);
            assert_eq!(turn.text(), Some(utterances[i / 2]));
        } else {
            assert_eq!(turn.role, Role::Assistant);
            assert_eq!(turn.text(), Some("ack"));
        }
    }
}

#[tokio::test]
async fn full_history_is_resent_with_model_roles() {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(200).set_body_json(reply_body("first"))).await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    reducer.handle_user_turn(&mut store, "q1").await;

    server.reset().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_json(json!({
            "contents": [
                { "role": "user", "parts": [ { "text": "q1" } ] },
                { "role": "model", "parts": [ { "text": "first" } ] },
                { "role": "user", "parts": [ { "text": "q2" } ] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("second")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = reducer.handle_user_turn(&mut store, "q2").await;
    assert_eq!(outcome.reply_text(), "second");
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn http_500_records_transport_error_turn() {
    let server = MockServer::start().await;
    mount_body(&server, ResponseTemplate::new(500).set_body_string("internal")).await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    store.append(Turn::user("earlier"));
    store.append(Turn::assistant("reply"));

    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(store.len(), 4);
    assert_eq!(store.all()[2], Turn::user("Hello"));
    let last = store.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    let text = last.text().unwrap();
    assert!(text.starts_with("Error: Could not connect to the API."), "got: {text}");
    assert!(text.contains("500"), "got: {text}");

    let notice = outcome.notice.unwrap();
    assert_eq!(notice.kind, ErrorKind::Transport);
    assert!(notice.message.starts_with("Error communicating with Gemini API:"));
    assert_eq!(outcome.state, ExchangeState::ErrorRendered);
}

#[tokio::test]
async fn http_400_is_treated_like_transport_failure() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({ "error": { "message": "API key not valid" } })),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(store.len(), 2);
    assert_eq!(outcome.notice.as_ref().unwrap().kind, ErrorKind::Transport);
    assert!(outcome.reply_text().contains("400"));
}

#[tokio::test]
async fn empty_candidates_yield_placeholder() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(store.len(), 2);
    assert_eq!(store.last().unwrap().text(), Some(PLACEHOLDER_REPLY));
    let notice = outcome.notice.unwrap();
    assert_eq!(notice.kind, ErrorKind::Shape);
    assert_eq!(
        notice.message,
        r#"Unexpected Gemini API response structure: {"candidates":[]}"#
    );
}

#[tokio::test]
async fn missing_text_yields_placeholder() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [ { "content": { "parts": [ { "functionCall": { "name": "f" } } ] } } ]
        })),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(outcome.reply_text(), PLACEHOLDER_REPLY);
    assert_eq!(
        outcome.notice.unwrap().message,
        "Gemini API response part missing 'text'."
    );
}

#[tokio::test]
async fn malformed_extra_candidate_does_not_hide_the_first() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [ { "content": { "parts": [ { "text": "hello" } ] } }, 42 ]
        })),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(outcome.state, ExchangeState::Rendered);
    assert!(outcome.notice.is_none());
    assert_eq!(store.last().unwrap().text(), Some("hello"));
}

#[tokio::test]
async fn malformed_extra_part_does_not_hide_the_first() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [ { "content": { "parts": [ { "text": "hello" }, { "text": 7 } ] } } ]
        })),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(outcome.state, ExchangeState::Rendered);
    assert_eq!(outcome.reply_text(), "hello");
}

#[tokio::test]
async fn non_json_body_records_decode_error() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(store.len(), 2);
    assert_eq!(store.last().unwrap().text(), Some(DECODE_ERROR_REPLY));
    assert_eq!(outcome.notice.unwrap().kind, ErrorKind::Decode);
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transport_error() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(reply_body("late"))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let reducer = reducer_for(&server.uri());
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(store.len(), 2);
    assert_eq!(outcome.notice.as_ref().unwrap().kind, ErrorKind::Transport);
    assert!(outcome.reply_text().starts_with("Error: Could not connect to the API."));
}

#[tokio::test]
async fn unreachable_endpoint_keeps_session_usable() {
    let reducer = reducer_for("http://127.0.0.1:1");
    let mut store = TurnStore::new();

    let outcome = reducer.handle_user_turn(&mut store, "first").await;
    assert_eq!(outcome.notice.as_ref().unwrap().kind, ErrorKind::Transport);

    let outcome = reducer.handle_user_turn(&mut store, "second").await;
    assert!(outcome.is_error());
    assert_eq!(store.len(), 4);
    assert_eq!(store.all()[2], Turn::user("second"));
}

fn assert_key_not_leaked(store: &TurnStore, outcome: &ExchangeOutcome, key: &str) {
    assert!(!outcome.reply_text().contains(key), "reply: {}", outcome.reply_text());
    let notice = outcome.notice.as_ref().unwrap();
    assert!(!notice.message.contains(key), "notice: {}", notice.message);
    for turn in store.all() {
        assert!(!turn.text().unwrap_or_default().contains(key));
    }
}

#[tokio::test]
async fn refused_connection_does_not_leak_api_key() {
    let key = "SUPERSECRET123";
    let reducer = reducer_with_key("http://127.0.0.1:1", key);
    let mut store = TurnStore::new();

    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(outcome.notice.as_ref().unwrap().kind, ErrorKind::Transport);
    assert_key_not_leaked(&store, &outcome, key);
}

#[tokio::test]
async fn timeout_does_not_leak_api_key() {
    let key = "SUPERSECRET123";
    let server = MockServer::start().await;
    mount_body(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(reply_body("late"))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let reducer = reducer_with_key(&server.uri(), key);
    let mut store = TurnStore::new();
    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(outcome.notice.as_ref().unwrap().kind, ErrorKind::Transport);
    assert_key_not_leaked(&store, &outcome, key);
}

#[tokio::test]
async fn unparseable_base_url_is_an_unexpected_error() {
    let reducer = reducer_for("not a url");
    let mut store = TurnStore::new();

    let outcome = reducer.handle_user_turn(&mut store, "Hello").await;

    assert_eq!(store.len(), 2);
    assert_eq!(outcome.state, ExchangeState::ErrorRendered);
    assert_eq!(outcome.notice.as_ref().unwrap().kind, ErrorKind::Unexpected);
    assert!(outcome
        .reply_text()
        .starts_with("An unexpected error occurred:"));
    assert_eq!(store.last().unwrap().text(), Some(outcome.reply_text()));
}
