#![deny(clippy::all)]
#![warn(missing_docs)]

//! # `anthropic-sse`
//!
//! An Anthropic Messages API client built around an incremental assembler for
//! server-sent event streams.
//!
//! A streamed response is decoded line by line, each event is reported to an
//! optional [`StreamObserver`](streaming::StreamObserver), and the content
//! blocks are merged into one [`MessagesCreateResponse`](types::messages::MessagesCreateResponse).
//! If the stream fails part-way, the error carries what was assembled so far.
//!
//! ## Quick Start
//!
//! ```no_run
//! use anthropic_sse::{Client, types::{content::MessageParam, messages::MessagesCreateRequest}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new();
//!
//! let req = MessagesCreateRequest::builder()
//!     .model("claude-3-5-sonnet-20240620")
//!     .max_tokens(256u32)
//!     .messages(vec![MessageParam::user("Hello!")])
//!     .build()?;
//!
//! let message = client.messages().open_stream(req).await?.into_message().await?;
//! println!("{}", message.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication
//!
//! The client supports API key and bearer token authentication.
//! See [`AnthropicConfig`] for configuration options.
//!
//! ## Stream options
//!
//! [`StreamOptions`] bounds how many unrecognized lines a stream may send and
//! decides whether a body that ends before `message_stop` is an error.

/// HTTP client implementation
pub mod client;
/// Configuration types for the client
pub mod config;
/// Error types
pub mod error;
/// Rate limit response headers
pub mod ratelimit;
/// API resource implementations
pub mod resources;
/// Retry logic utilities
pub mod retry;
/// Server-sent events decoding and message assembly
pub mod sse;
/// Test support utilities (for use in tests)
#[doc(hidden)]
pub mod test_support;
/// Request and response types
pub mod types;

pub use crate::client::Client;
pub use crate::config::{AnthropicAuth, AnthropicConfig, BetaFeature, StreamOptions};
pub use crate::error::{AnthropicError, ApiErrorObject};

/// Streaming types
pub mod streaming {
    pub use crate::sse::{
        ContentBlockDelta, EmptyFrameGuard, Event, EventStream, FrameItem, MessageAssembler,
        MessageDelta, MessageDeltaUsage, MessagePhase, MessageStream, NoopObserver, SSEDecoder,
        SseFrame, StreamObserver,
    };
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::streaming::{Event, MessageStream, StreamObserver};
    pub use crate::types::common::*;
    pub use crate::types::content::*;
    pub use crate::types::messages::*;
    pub use crate::{AnthropicConfig, AnthropicError, Client, StreamOptions};
}
