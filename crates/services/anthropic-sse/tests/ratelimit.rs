use anthropic_sse::ratelimit::RateLimitHeaders;
use anthropic_sse::test_support::sse_body;
use anthropic_sse::types::content::MessageParam;
use anthropic_sse::types::messages::MessagesCreateRequest;
use anthropic_sse::{AnthropicConfig, AnthropicError, Client};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> MessagesCreateRequest {
    MessagesCreateRequest {
        model: "claude-3-5-sonnet-20240620".into(),
        max_tokens: 16,
        messages: vec![MessageParam::user("hi")],
        ..Default::default()
    }
}

fn body() -> String {
    sse_body(&[("message_stop", json!({"type": "message_stop"}))])
}

#[tokio::test]
async fn rate_limits_read_from_stream_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("anthropic-ratelimit-requests-limit", "50")
                .insert_header("anthropic-ratelimit-requests-remaining", "49")
                .insert_header("anthropic-ratelimit-requests-reset", "2024-06-20T12:00:30Z")
                .insert_header("anthropic-ratelimit-tokens-limit", "40000")
                .insert_header("anthropic-ratelimit-tokens-remaining", "39000")
                .insert_header("anthropic-ratelimit-tokens-reset", "2024-06-20T12:00:05Z")
                .set_body_raw(body(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let client = Client::with_config(
        AnthropicConfig::new()
            .with_api_base(server.uri())
            .with_api_key("test-api-key"),
    );
    let stream = client.messages().open_stream(request()).await.unwrap();
    let RateLimitHeaders {
        requests_remaining,
        tokens_limit,
        tokens_reset,
        retry_after,
        ..
    } = stream.rate_limits().unwrap();
    assert_eq!(requests_remaining, 49);
    assert_eq!(tokens_limit, 40_000);
    assert_eq!(tokens_reset.to_rfc3339(), "2024-06-20T12:00:05+00:00");
    assert_eq!(retry_after, None);

    stream.into_message().await.unwrap();
}

#[tokio::test]
async fn missing_headers_reported_together() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("anthropic-ratelimit-requests-limit", "fifty")
                .set_body_raw(body(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let client = Client::with_config(
        AnthropicConfig::new()
            .with_api_base(server.uri())
            .with_api_key("test-api-key"),
    );
    let stream = client.messages().open_stream(request()).await.unwrap();
    match stream.rate_limits() {
        Err(AnthropicError::InvalidHeader(msg)) => {
            assert!(msg.contains("anthropic-ratelimit-requests-limit"));
            assert!(msg.contains("anthropic-ratelimit-tokens-reset"));
        }
        other => panic!("Expected InvalidHeader, got {other:?}"),
    }
}
