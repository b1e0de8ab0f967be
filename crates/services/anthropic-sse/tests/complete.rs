use anthropic_sse::types::complete::{AI_PROMPT, CompleteRequest, HUMAN_PROMPT};
use anthropic_sse::{AnthropicConfig, AnthropicError, Client};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> Client<AnthropicConfig> {
    let config = AnthropicConfig::new()
        .with_api_base(server.uri())
        .with_api_key("test-api-key");
    Client::with_config(config)
}

#[tokio::test]
async fn complete_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/complete"))
        .and(body_partial_json(json!({
            "prompt": format!("{HUMAN_PROMPT} Tell me a haiku{AI_PROMPT}"),
            "max_tokens_to_sample": 64
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "compl_01",
            "type": "completion",
            "completion": " Leaves drift on the pond",
            "stop_reason": "stop_sequence",
            "model": "claude-2.1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let req = CompleteRequest::from_user_turn("claude-2.1", "Tell me a haiku", 64);
    let resp = test_client(&server).complete().create(req).await.unwrap();
    assert_eq!(resp.completion, " Leaves drift on the pond");
    assert_eq!(resp.stop_reason.as_deref(), Some("stop_sequence"));
}

#[tokio::test]
async fn zero_max_tokens_rejected() {
    let server = MockServer::start().await;
    let req = CompleteRequest::from_user_turn("claude-2.1", "hi", 0);
    assert!(matches!(
        test_client(&server).complete().create(req).await,
        Err(AnthropicError::Config(_))
    ));
}
