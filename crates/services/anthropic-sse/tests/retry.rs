use anthropic_sse::types::content::MessageParam;
use anthropic_sse::types::messages::MessagesCreateRequest;
use anthropic_sse::{AnthropicConfig, Client};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client_fast_retry(server: &MockServer) -> Client<AnthropicConfig> {
    let config = AnthropicConfig::new()
        .with_api_base(server.uri())
        .with_api_key("test-api-key");
    Client::with_config(config).with_backoff(
        backon::ExponentialBuilder::default()
            .with_min_delay(std::time::Duration::from_millis(10))
            .with_max_delay(std::time::Duration::from_millis(50))
            .with_max_times(3),
    )
}

fn request() -> MessagesCreateRequest {
    MessagesCreateRequest {
        model: "claude-3-5-sonnet-20240620".into(),
        max_tokens: 16,
        messages: vec![MessageParam::user("hi")],
        ..Default::default()
    }
}

fn ok_body() -> serde_json::Value {
    json!({
        "id": "msg_ok",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20240620",
        "content": [{"type": "text", "text": "hello"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 3, "output_tokens": 1}
    })
}

#[tokio::test]
async fn retry_429_then_success() {
    let server = MockServer::start().await;

    // First request returns 429, second returns success
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "slow down"}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resp = test_client_fast_retry(&server)
        .messages()
        .create(request())
        .await
        .unwrap();
    assert_eq!(resp.text(), "hello");
}

#[tokio::test]
async fn retry_529_plain_text_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("Overloaded"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resp = test_client_fast_retry(&server)
        .messages()
        .create(request())
        .await
        .unwrap();
    assert_eq!(resp.id, "msg_ok");
}

#[tokio::test]
async fn client_errors_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_fast_retry(&server)
        .messages()
        .create(request())
        .await
        .unwrap_err();
    assert!(err.api_error().unwrap().is_authentication());
}

#[tokio::test]
async fn gives_up_after_max_times() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let err = test_client_fast_retry(&server)
        .messages()
        .create(request())
        .await
        .unwrap_err();
    let api = err.api_error().unwrap();
    assert_eq!(api.status_code, Some(503));
    assert_eq!(api.r#type.as_deref(), Some("http_503"));
}

#[tokio::test]
async fn streaming_requests_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_fast_retry(&server)
        .messages()
        .open_stream(request())
        .await
        .unwrap_err();
    assert_eq!(err.api_error().unwrap().status_code, Some(500));
}
