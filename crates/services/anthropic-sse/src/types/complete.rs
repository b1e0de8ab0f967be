use serde::{Deserialize, Serialize};

use super::common::Metadata;

/// Prompt prefix expected by the legacy completions endpoint
pub const HUMAN_PROMPT: &str = "\n\nHuman:";
/// Prompt suffix expected by the legacy completions endpoint
pub const AI_PROMPT: &str = "\n\nAssistant:";

/// Legacy text completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CompleteRequest {
    /// Model to use
    pub model: String,
    /// Prompt in `\n\nHuman: ... \n\nAssistant:` form
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens_to_sample: u32,
    /// Optional stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Optional temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Optional nucleus sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Optional top-k sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Optional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl CompleteRequest {
    /// Wraps a single user turn in the human/assistant prompt markers
    #[must_use]
    pub fn from_user_turn(model: impl Into<String>, text: &str, max_tokens_to_sample: u32) -> Self {
        Self {
            model: model.into(),
            prompt: format!("{HUMAN_PROMPT} {text}{AI_PROMPT}"),
            max_tokens_to_sample,
            ..Default::default()
        }
    }
}

/// Legacy text completion response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompleteResponse {
    /// Completion ID
    pub id: String,
    /// Object type (always "completion")
    #[serde(rename = "type")]
    pub kind: String,
    /// Generated text
    pub completion: String,
    /// `stop_sequence` or `max_tokens`
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Model used
    pub model: String,
}
