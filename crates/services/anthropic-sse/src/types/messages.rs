use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::common::{Metadata, Usage};
use super::content::{
    ContentBlock, ContentBlockParam, MessageContentParam, MessageParam, MessageRole, SystemParam,
};
use super::tools::{Tool, ToolChoice};

/// Extended thinking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThinkingConfig {
    /// Thinking enabled with a token budget
    Enabled {
        /// Tokens the model may spend thinking (must be below `max_tokens`)
        budget_tokens: u32,
    },
    /// Thinking disabled
    Disabled,
}

/// Request to create a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder, Default)]
#[builder(setter(into, strip_option), default)]
pub struct MessagesCreateRequest {
    /// Model to use for generation
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Optional system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemParam>,
    /// Conversation messages
    pub messages: Vec<MessageParam>,
    /// Optional temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Optional stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Optional nucleus sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Optional top-k sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Optional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Optional tools for Claude to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Optional tool choice strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Optional extended thinking configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
    /// Stream the response as server-sent events
    ///
    /// Managed by the client: `create` clears it, the streaming calls set it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl MessagesCreateRequest {
    /// Starts a builder for a request
    #[must_use]
    pub fn builder() -> MessagesCreateRequestBuilder {
        MessagesCreateRequestBuilder::default()
    }
}

/// Response from creating a message
///
/// This is also the value a streamed response is assembled into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessagesCreateResponse {
    /// Message ID
    pub id: String,
    /// Type of response (always "message")
    #[serde(rename = "type", default = "message_type")]
    pub kind: String,
    /// Role of the response
    #[serde(default)]
    pub role: MessageRole,
    /// Content blocks in the response
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Model used for generation
    pub model: String,
    /// Why generation stopped (`end_turn`, `max_tokens`, `stop_sequence`, `tool_use`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Which custom stop sequence matched, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
    /// Optional token usage information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

fn message_type() -> String {
    "message".to_string()
}

impl MessagesCreateResponse {
    /// Concatenated text of all text blocks
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect()
    }

    /// Text of the first text block
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }

    /// Tool invocations in content order, as `(id, name, input)`
    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &str, &serde_json::Value)> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => {
                Some((id.as_str(), name.as_str(), input))
            }
            _ => None,
        })
    }
}

/// Replays an assistant response as the next conversation turn
impl From<MessagesCreateResponse> for MessageParam {
    fn from(resp: MessagesCreateResponse) -> Self {
        Self {
            role: resp.role,
            content: MessageContentParam::Blocks(
                resp.content
                    .into_iter()
                    .map(ContentBlockParam::from)
                    .collect(),
            ),
        }
    }
}

/// Request to count tokens for a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageTokensCountRequest {
    /// Model to use for token counting
    pub model: String,
    /// Optional system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemParam>,
    /// Conversation messages
    pub messages: Vec<MessageParam>,
    /// Optional tools for Claude to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Optional tool choice strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// Response from counting tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageTokensCountResponse {
    /// Number of input tokens
    pub input_tokens: u64,
}
