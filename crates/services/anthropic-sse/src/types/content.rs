use serde::{Deserialize, Serialize};

use super::common::CacheControl;

/// Content for tool results
///
/// Can be either a simple string or an array of content blocks.
/// Tool results can contain text or images, but not nested tool results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Simple string content
    String(String),
    /// Array of content blocks (text or image)
    Blocks(Vec<ToolResultContentBlock>),
}

/// Content block for tool results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultContentBlock {
    /// Text content block
    Text {
        /// The text content
        text: String,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Image content block
    Image {
        /// Image source (base64 or URL)
        source: ImageSource,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
}

impl From<&str> for ToolResultContent {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ToolResultContent {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Image source for multimodal content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Base64-encoded image data
    Base64 {
        /// Media type (e.g., "image/png")
        media_type: String,
        /// Base64-encoded image data
        data: String,
    },
    /// Image URL
    Url {
        /// URL to the image
        url: String,
    },
}

/// Document source for multimodal content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentSource {
    /// Base64-encoded document data
    Base64 {
        /// Media type (e.g., "application/pdf")
        media_type: String,
        /// Base64-encoded document data
        data: String,
    },
    /// Document URL
    Url {
        /// URL to the document
        url: String,
    },
    /// Plain text document
    Text {
        /// Media type (always "text/plain")
        media_type: String,
        /// Document text
        data: String,
    },
    /// Caller-chunked document; each block is one citable unit
    Content {
        /// Document chunks
        content: Vec<ContentBlockParam>,
    },
}

impl DocumentSource {
    /// Plain text document source
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text {
            media_type: "text/plain".into(),
            data: data.into(),
        }
    }
}

/// Toggle for document citations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CitationsConfig {
    /// Whether the model should cite this document
    pub enabled: bool,
}

/// A reference from generated text back to a span of a source document
///
/// The variant is selected by the wire `type` tag and carries only the range
/// fields meaningful for that location kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Citation {
    /// Character range within a plain text document
    CharLocation {
        /// Quoted source text
        cited_text: String,
        /// Index of the cited document in the request
        document_index: usize,
        /// Title of the cited document
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_title: Option<String>,
        /// First character (inclusive)
        start_char_index: usize,
        /// Last character (exclusive)
        end_char_index: usize,
    },
    /// Page range within a PDF document
    #[serde(alias = "page_number")]
    PageLocation {
        /// Quoted source text
        cited_text: String,
        /// Index of the cited document in the request
        document_index: usize,
        /// Title of the cited document
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_title: Option<String>,
        /// First page (1-based, inclusive)
        start_page_number: usize,
        /// Last page (exclusive)
        end_page_number: usize,
    },
    /// Block range within a custom content document
    #[serde(alias = "block_index")]
    ContentBlockLocation {
        /// Quoted source text
        cited_text: String,
        /// Index of the cited document in the request
        document_index: usize,
        /// Title of the cited document
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_title: Option<String>,
        /// First block (inclusive)
        start_block_index: usize,
        /// Last block (exclusive)
        end_block_index: usize,
    },
}

impl Citation {
    /// The quoted source text
    #[must_use]
    pub fn cited_text(&self) -> &str {
        match self {
            Self::CharLocation { cited_text, .. }
            | Self::PageLocation { cited_text, .. }
            | Self::ContentBlockLocation { cited_text, .. } => cited_text,
        }
    }

    /// Index of the cited document
    #[must_use]
    pub const fn document_index(&self) -> usize {
        match self {
            Self::CharLocation { document_index, .. }
            | Self::PageLocation { document_index, .. }
            | Self::ContentBlockLocation { document_index, .. } => *document_index,
        }
    }
}

/// Role of a message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// User message
    User,
    /// Assistant message
    #[default]
    Assistant,
}

// Request-side content blocks
/// Content block parameter for requests
///
/// This enum represents the various types of content that can be sent in a request.
/// Note that this is separate from the response `ContentBlock` enum due to the
/// asymmetric nature of the Anthropic API - requests accept more content types
/// than responses return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockParam {
    /// Text content block
    Text {
        /// The text content
        text: String,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Image content block
    Image {
        /// Image source (base64 or URL)
        source: ImageSource,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Document content block
    Document {
        /// Document source
        source: DocumentSource,
        /// Optional document title, echoed back in citations
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Optional context about the document (not citable)
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        /// Enables citations for this document
        #[serde(skip_serializing_if = "Option::is_none")]
        citations: Option<CitationsConfig>,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Tool invocation from a previous assistant turn
    ToolUse {
        /// Tool use ID
        id: String,
        /// Tool name
        name: String,
        /// Tool input
        input: serde_json::Value,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Tool result block
    ToolResult {
        /// ID of the tool use that this is responding to
        tool_use_id: String,
        /// Optional result content (string or array of content blocks)
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        /// Whether this is an error result
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
        /// Optional cache control for prompt caching
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Extended thinking from a previous assistant turn
    Thinking {
        /// Thinking text
        thinking: String,
        /// Integrity signature issued by the server
        signature: String,
    },
    /// Redacted extended thinking from a previous assistant turn
    RedactedThinking {
        /// Opaque encrypted payload
        data: String,
    },
    /// Block of a kind this client has no type for, sent exactly as given
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl ContentBlockParam {
    /// Plain text block without cache control
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            cache_control: None,
        }
    }

    /// Successful tool result with string content
    #[must_use]
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<ToolResultContent>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: Some(content.into()),
            is_error: None,
            cache_control: None,
        }
    }
}

// Response-side content blocks
/// Content block in a response
///
/// Exactly one kind is active per block; the fields of the other kinds do not
/// exist on it. While streaming, `text`, `thinking` and `signature` grow by
/// delta, `citations` is append-only, and `tool_use` input is replaced once
/// when the block stops.
///
/// Kinds this client does not know, such as server tool blocks, decode to
/// [`ContentBlock::Unknown`] and keep their payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "serde_json::Value")]
pub enum ContentBlock {
    /// Text content block
    Text {
        /// The text content
        #[serde(default)]
        text: String,
        /// Citations supporting the text, in arrival order
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        citations: Vec<Citation>,
    },
    /// Image content block
    Image {
        /// Image source
        source: ImageSource,
    },
    /// Document content block
    Document {
        /// Document source
        source: DocumentSource,
        /// Optional document title
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Tool use block
    ToolUse {
        /// Tool use ID
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON value
        #[serde(default = "empty_object")]
        input: serde_json::Value,
    },
    /// Tool result block
    ToolResult {
        /// ID of the tool use this result answers
        tool_use_id: String,
        /// Result content
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        /// Whether the tool failed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Extended thinking block
    Thinking {
        /// Thinking text
        #[serde(default)]
        thinking: String,
        /// Integrity signature
        #[serde(default)]
        signature: String,
    },
    /// Redacted extended thinking block
    RedactedThinking {
        /// Opaque encrypted payload
        data: String,
    },
    /// A block kind this client has no type for, as received
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

// Wire shape of the known kinds. Unknown `type` values never reach it.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownBlock {
    Text {
        #[serde(default)]
        text: String,
        #[serde(default)]
        citations: Vec<Citation>,
    },
    Image {
        source: ImageSource,
    },
    Document {
        source: DocumentSource,
        #[serde(default)]
        title: Option<String>,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default = "empty_object")]
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Option<ToolResultContent>,
        #[serde(default)]
        is_error: Option<bool>,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
        #[serde(default)]
        signature: String,
    },
    RedactedThinking {
        data: String,
    },
}

const KNOWN_BLOCK_KINDS: [&str; 7] = [
    "text",
    "image",
    "document",
    "tool_use",
    "tool_result",
    "thinking",
    "redacted_thinking",
];

impl TryFrom<serde_json::Value> for ContentBlock {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| "content block without a string `type`".to_string())?;
        if !KNOWN_BLOCK_KINDS.contains(&kind) {
            return Ok(Self::Unknown(value));
        }
        let known: KnownBlock = serde_json::from_value(value).map_err(|e| e.to_string())?;
        Ok(match known {
            KnownBlock::Text { text, citations } => Self::Text { text, citations },
            KnownBlock::Image { source } => Self::Image { source },
            KnownBlock::Document { source, title } => Self::Document { source, title },
            KnownBlock::ToolUse { id, name, input } => Self::ToolUse { id, name, input },
            KnownBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Self::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
            KnownBlock::Thinking {
                thinking,
                signature,
            } => Self::Thinking {
                thinking,
                signature,
            },
            KnownBlock::RedactedThinking { data } => Self::RedactedThinking { data },
        })
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ContentBlock {
    /// Text block with no citations
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    /// Wire name of the active kind
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Document { .. } => "document",
            Self::ToolUse { .. } => "tool_use",
            Self::ToolResult { .. } => "tool_result",
            Self::Thinking { .. } => "thinking",
            Self::RedactedThinking { .. } => "redacted_thinking",
            Self::Unknown(raw) => raw
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    /// Returns the text of a text block
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl From<ContentBlock> for ContentBlockParam {
    fn from(block: ContentBlock) -> Self {
        match block {
            // Citations are response-only; the text is what gets replayed
            ContentBlock::Text { text, .. } => Self::Text {
                text,
                cache_control: None,
            },
            ContentBlock::Image { source } => Self::Image {
                source,
                cache_control: None,
            },
            ContentBlock::Document { source, title } => Self::Document {
                source,
                title,
                context: None,
                citations: None,
                cache_control: None,
            },
            ContentBlock::ToolUse { id, name, input } => Self::ToolUse {
                id,
                name,
                input,
                cache_control: None,
            },
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Self::ToolResult {
                tool_use_id,
                content,
                is_error,
                cache_control: None,
            },
            ContentBlock::Thinking {
                thinking,
                signature,
            } => Self::Thinking {
                thinking,
                signature,
            },
            ContentBlock::RedactedThinking { data } => Self::RedactedThinking { data },
            ContentBlock::Unknown(raw) => Self::Other(raw),
        }
    }
}

/// System prompt parameter
///
/// Can be either a simple string or an array of text blocks with cache control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SystemParam {
    /// Simple string system prompt
    String(String),
    /// Array of text blocks with optional cache control
    Blocks(Vec<TextBlockParam>),
}

/// Message content parameter
///
/// Can be either a simple string or an array of content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContentParam {
    /// Simple string content
    String(String),
    /// Array of content blocks
    Blocks(Vec<ContentBlockParam>),
}

/// Text block parameter for system prompts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextBlockParam {
    /// The text content
    pub text: String,
    /// Type field for serialization (always "text")
    #[serde(
        rename = "type",
        default = "text_type",
        skip_serializing_if = "is_text"
    )]
    pub kind: String,
    /// Optional cache control for prompt caching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

fn text_type() -> String {
    "text".to_string()
}

fn is_text(s: &str) -> bool {
    s == "text"
}

impl TextBlockParam {
    /// Creates a new text block without cache control
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: text_type(),
            cache_control: None,
        }
    }

    /// Creates a new text block with cache control
    #[must_use]
    pub fn with_cache_control(text: impl Into<String>, cache_control: CacheControl) -> Self {
        Self {
            text: text.into(),
            kind: text_type(),
            cache_control: Some(cache_control),
        }
    }
}

/// A message parameter in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageParam {
    /// Role of the message
    pub role: MessageRole,
    /// Content of the message
    pub content: MessageContentParam,
}

impl MessageParam {
    /// User turn with string content
    #[must_use]
    pub fn user(content: impl Into<MessageContentParam>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Assistant turn with string content
    #[must_use]
    pub fn assistant(content: impl Into<MessageContentParam>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&str> for MessageContentParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for MessageContentParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<ContentBlockParam>> for MessageContentParam {
    fn from(blocks: Vec<ContentBlockParam>) -> Self {
        Self::Blocks(blocks)
    }
}

impl From<&str> for SystemParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for SystemParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
