//! API resource implementations for the Anthropic client

/// Message Batches API resource
pub mod batches;
/// Legacy text completions API resource
pub mod complete;
/// Messages API resource
pub mod messages;

pub use batches::Batches;
pub use complete::Complete;
pub use messages::Messages;
