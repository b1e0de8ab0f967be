use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use super::decoder::SseFrame;
use crate::error::{AnthropicError, ApiErrorDetail};
use crate::types::content::{Citation, ContentBlock, ImageSource, ToolResultContent};
use crate::types::messages::MessagesCreateResponse;

/// Streaming event types from the Anthropic Messages API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Message creation started
    MessageStart {
        /// The message shell: identity, model, initial usage, (empty) content
        message: MessagesCreateResponse,
    },
    /// Content block started
    ContentBlockStart {
        /// Position of the block
        index: usize,
        /// Initial block value
        content_block: ContentBlock,
    },
    /// Incremental update for a content block
    ContentBlockDelta {
        /// Position of the block being updated
        index: usize,
        /// The fragment
        delta: ContentBlockDelta,
    },
    /// Content block completed
    ContentBlockStop {
        /// Position of the completed block
        index: usize,
    },
    /// Message-level update: stop reason and output token count
    MessageDelta {
        /// Stop reason and stop sequence
        delta: MessageDelta,
        /// Updated usage information
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<MessageDeltaUsage>,
    },
    /// Message streaming completed
    MessageStop,
    /// Keep-alive
    Ping,
    /// Error reported inside the stream
    Error {
        /// Error details
        error: ApiErrorDetail,
    },
}

impl Event {
    /// Wire name of the event
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MessageStart { .. } => "message_start",
            Self::ContentBlockStart { .. } => "content_block_start",
            Self::ContentBlockDelta { .. } => "content_block_delta",
            Self::ContentBlockStop { .. } => "content_block_stop",
            Self::MessageDelta { .. } => "message_delta",
            Self::MessageStop => "message_stop",
            Self::Ping => "ping",
            Self::Error { .. } => "error",
        }
    }
}

/// Fragment of a content block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "RawDelta")]
pub enum ContentBlockDelta {
    /// Text to append to a text block
    TextDelta {
        /// Text fragment
        text: String,
    },
    /// Raw JSON fragment to append to a tool use block's input buffer
    InputJsonDelta {
        /// Not valid JSON on its own
        partial_json: String,
    },
    /// Text to append to a thinking block
    ThinkingDelta {
        /// Thinking fragment
        thinking: String,
    },
    /// Text to append to a thinking block's signature
    SignatureDelta {
        /// Signature fragment
        signature: String,
    },
    /// One citation to append to a text block
    CitationsDelta {
        /// The citation
        citation: Citation,
    },
    /// Whole replacement for an image block's source
    Image {
        /// New source
        source: ImageSource,
    },
    /// Whole replacement for a tool result block's value
    ToolResult {
        /// Tool use the result answers; kept when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_use_id: Option<String>,
        /// New content
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        /// New error flag
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Delta type this client does not know
    Unknown,
}

impl ContentBlockDelta {
    /// Wire name of the delta kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "text_delta",
            Self::InputJsonDelta { .. } => "input_json_delta",
            Self::ThinkingDelta { .. } => "thinking_delta",
            Self::SignatureDelta { .. } => "signature_delta",
            Self::CitationsDelta { .. } => "citations_delta",
            Self::Image { .. } => "image",
            Self::ToolResult { .. } => "tool_result",
            Self::Unknown => "unknown",
        }
    }
}

// Wire shape of a delta. `citations_delta` is sent either with a single
// `citation` object or with a one-element `citations` array.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawDelta {
    TextDelta {
        text: String,
    },
    InputJsonDelta {
        partial_json: String,
    },
    ThinkingDelta {
        thinking: String,
    },
    SignatureDelta {
        signature: String,
    },
    CitationsDelta {
        #[serde(default)]
        citation: Option<Citation>,
        #[serde(default)]
        citations: Vec<Citation>,
    },
    Image {
        source: ImageSource,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Option<ToolResultContent>,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Unknown,
}

impl TryFrom<RawDelta> for ContentBlockDelta {
    type Error = String;

    fn try_from(raw: RawDelta) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawDelta::TextDelta { text } => Self::TextDelta { text },
            RawDelta::InputJsonDelta { partial_json } => Self::InputJsonDelta { partial_json },
            RawDelta::ThinkingDelta { thinking } => Self::ThinkingDelta { thinking },
            RawDelta::SignatureDelta { signature } => Self::SignatureDelta { signature },
            RawDelta::CitationsDelta {
                citation,
                citations,
            } => {
                let citation = citation
                    .or_else(|| citations.into_iter().next())
                    .ok_or_else(|| "citations_delta without a citation".to_string())?;
                Self::CitationsDelta { citation }
            }
            RawDelta::Image { source } => Self::Image { source },
            RawDelta::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Self::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
            RawDelta::Unknown => Self::Unknown,
        })
    }
}

/// Message delta payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessageDelta {
    /// Stop reason
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence that triggered stop
    #[serde(default)]
    pub stop_sequence: Option<String>,
}

/// Usage information in `message_delta`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageDeltaUsage {
    /// Output tokens generated so far
    pub output_tokens: u64,
}

// =============================================================================
// Frame dispatch
// =============================================================================

impl Event {
    /// Decode a frame into a typed event, selected by the frame's event name
    ///
    /// Returns `Ok(None)` when the frame has no event name or one this client does
    /// not recognize; such frames count as unmatched.
    ///
    /// # Errors
    ///
    /// Returns [`AnthropicError::Serde`] if the payload of a recognized event is
    /// malformed. This is fatal for the stream.
    pub fn from_frame(frame: &SseFrame) -> Result<Option<Self>, AnthropicError> {
        let Some(name) = frame.event.as_deref() else {
            return Ok(None);
        };
        let data = frame.data.as_str();

        let event = match name {
            "message_start" => {
                let p: MessageStartEvent = decode(name, data)?;
                Self::MessageStart { message: p.message }
            }
            "content_block_start" => {
                let p: ContentBlockStartEvent = decode(name, data)?;
                Self::ContentBlockStart {
                    index: p.index,
                    content_block: p.content_block,
                }
            }
            "content_block_delta" => {
                let p: ContentBlockDeltaEvent = decode(name, data)?;
                Self::ContentBlockDelta {
                    index: p.index,
                    delta: p.delta,
                }
            }
            "content_block_stop" => {
                let p: ContentBlockStopEvent = decode(name, data)?;
                Self::ContentBlockStop { index: p.index }
            }
            "message_delta" => {
                let p: MessageDeltaEvent = decode(name, data)?;
                Self::MessageDelta {
                    delta: p.delta,
                    usage: p.usage,
                }
            }
            "message_stop" => {
                decode::<IgnoredAny>(name, data)?;
                Self::MessageStop
            }
            "ping" => {
                decode::<IgnoredAny>(name, data)?;
                Self::Ping
            }
            "error" => {
                let p: ErrorEvent = decode(name, data)?;
                Self::Error { error: p.error }
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

fn decode<T: DeserializeOwned>(name: &str, data: &str) -> Result<T, AnthropicError> {
    serde_json::from_str(data).map_err(|e| AnthropicError::Serde(format!("{name}: {e}")))
}

// Wire format structures for deserialization
#[derive(Deserialize)]
struct MessageStartEvent {
    message: MessagesCreateResponse,
}

#[derive(Deserialize)]
struct ContentBlockStartEvent {
    index: usize,
    content_block: ContentBlock,
}

#[derive(Deserialize)]
struct ContentBlockDeltaEvent {
    index: usize,
    delta: ContentBlockDelta,
}

#[derive(Deserialize)]
struct ContentBlockStopEvent {
    index: usize,
}

#[derive(Deserialize)]
struct MessageDeltaEvent {
    delta: MessageDelta,
    #[serde(default)]
    usage: Option<MessageDeltaUsage>,
}

#[derive(Deserialize)]
struct ErrorEvent {
    error: ApiErrorDetail,
}
