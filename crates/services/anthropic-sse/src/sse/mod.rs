//! Streaming message assembly
//!
//! A streamed response flows through four stages:
//!
//! 1. [`SSEDecoder`] splits the body into lines and pairs each `data:` line with
//!    the most recent `event:` name.
//! 2. [`Event::from_frame`] decodes a frame into a typed [`Event`].
//! 3. [`EmptyFrameGuard`] counts lines that carried no usable event and aborts
//!    a stream that keeps producing them.
//! 4. [`MessageAssembler`] folds events into a [`MessagesCreateResponse`],
//!    merging each content block delta according to its kind.
//!
//! [`MessageStream`] drives the stages over a byte stream and reports each event
//! to a [`StreamObserver`].
//!
//! [`MessagesCreateResponse`]: crate::types::messages::MessagesCreateResponse

mod assembler;
mod decoder;
mod event;
mod guard;
mod merge;
mod observer;
mod stream;

pub use assembler::{MessageAssembler, MessagePhase};
pub use decoder::{FrameItem, SSEDecoder, SseFrame};
pub use event::{ContentBlockDelta, Event, MessageDelta, MessageDeltaUsage};
pub use guard::EmptyFrameGuard;
pub use observer::{NoopObserver, StreamObserver};
pub use stream::{EventStream, MessageStream};
