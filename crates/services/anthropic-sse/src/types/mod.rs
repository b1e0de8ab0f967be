//! Request and response types for the Anthropic API

/// Message batch types
pub mod batches;
/// Shared types: cache control, usage, metadata
pub mod common;
/// Legacy text completion types
pub mod complete;
/// Content blocks, citations and message parameters
pub mod content;
/// Messages endpoint types
pub mod messages;
/// Tool definitions and tool choice
pub mod tools;

pub use common::*;
pub use content::{Citation, ContentBlock, ContentBlockParam, MessageParam, MessageRole};
pub use messages::{MessagesCreateRequest, MessagesCreateResponse};
