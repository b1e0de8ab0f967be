use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest::header::HeaderMap;
use tracing::{debug, trace};

use super::assembler::MessageAssembler;
use super::decoder::{FrameItem, SSEDecoder};
use super::event::Event;
use super::guard::EmptyFrameGuard;
use super::observer::{NoopObserver, StreamObserver, dispatch};
use crate::config::StreamOptions;
use crate::error::{AnthropicError, HDR_REQUEST_ID};
use crate::ratelimit::RateLimitHeaders;
use crate::types::messages::MessagesCreateResponse;

/// Stream of typed events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Event, AnthropicError>> + Send + 'static>>;

type ByteStream = BoxStream<'static, Result<Bytes, AnthropicError>>;

// Pulls bytes on demand and turns them into events, one at a time.
struct EventCursor {
    body: ByteStream,
    decoder: SSEDecoder,
    guard: EmptyFrameGuard,
    pending: VecDeque<FrameItem>,
    eof: bool,
}

impl EventCursor {
    fn new(body: ByteStream, options: StreamOptions) -> Self {
        Self {
            body,
            decoder: SSEDecoder::new(),
            guard: EmptyFrameGuard::new(options.empty_messages_limit),
            pending: VecDeque::new(),
            eof: false,
        }
    }

    /// Next recognized event, or `None` at end of stream
    async fn next_event(&mut self) -> Result<Option<Event>, AnthropicError> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                match item {
                    FrameItem::Frame(frame) => {
                        if let Some(event) = Event::from_frame(&frame)? {
                            trace!(event = event.name(), "decoded stream event");
                            return Ok(Some(event));
                        }
                        debug!(event = ?frame.event, "data line without a known event name");
                        self.guard.record()?;
                    }
                    FrameItem::Unmatched(line) => {
                        trace!(%line, "unmatched stream line");
                        self.guard.record()?;
                    }
                }
                continue;
            }

            if self.eof {
                return Ok(None);
            }
            match self.body.next().await {
                Some(chunk) => {
                    let chunk = chunk?;
                    self.pending.extend(self.decoder.push(&chunk));
                }
                None => {
                    self.eof = true;
                    self.pending.extend(self.decoder.flush());
                }
            }
        }
    }

    /// Discard lines already read past `message_stop`; the body is not polled again
    fn discard_buffered(&mut self) {
        for item in self.pending.drain(..) {
            trace!(?item, "ignored after message_stop");
        }
    }
}

/// An open streamed response
///
/// Holds the response headers and the unread body. Consume it with
/// [`MessageStream::assemble`] to build the final message (optionally watching
/// each event), or with [`MessageStream::into_events`] to handle events yourself.
/// Either way the body is read lazily, one chunk at a time.
pub struct MessageStream {
    headers: HeaderMap,
    body: ByteStream,
    options: StreamOptions,
}

impl std::fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStream")
            .field("headers", &self.headers)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl MessageStream {
    /// Wrap a successful HTTP response whose body is an event stream
    #[must_use]
    pub fn from_response(response: reqwest::Response, options: StreamOptions) -> Self {
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(AnthropicError::from))
            .boxed();
        Self {
            headers,
            body,
            options,
        }
    }

    /// Wrap any byte stream, e.g. a recorded response or a different transport
    #[must_use]
    pub fn from_byte_stream<S, B, E>(stream: S, options: StreamOptions) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: Into<Bytes> + 'static,
        E: Into<AnthropicError> + 'static,
    {
        let body = stream
            .map(|chunk| -> Result<Bytes, AnthropicError> {
                chunk.map(Into::into).map_err(Into::into)
            })
            .boxed();
        Self {
            headers: HeaderMap::new(),
            body,
            options,
        }
    }

    /// Response headers
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Server request ID, if the response carried one
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(HDR_REQUEST_ID)?.to_str().ok()
    }

    /// Rate limit state reported with the response
    ///
    /// # Errors
    ///
    /// Returns [`AnthropicError::InvalidHeader`] if any rate limit header is
    /// missing or malformed.
    pub fn rate_limits(&self) -> Result<RateLimitHeaders, AnthropicError> {
        RateLimitHeaders::from_headers(&self.headers)
    }

    /// Read the stream to its end and return the assembled message
    ///
    /// `observer` sees every event before it is applied. The call returns as
    /// soon as `message_stop` is applied; lines already buffered after it are
    /// discarded and the rest of the body is dropped unread.
    ///
    /// # Errors
    ///
    /// Every failure is returned as [`AnthropicError::StreamInterrupted`]
    /// carrying the message assembled so far. Match on
    /// [`AnthropicError::cause`] to get the underlying error, e.g. the
    /// transport error of a failed read. The wrapped cause is one of:
    /// - [`AnthropicError::Api`] for an `error` event
    /// - [`AnthropicError::Serde`] for a malformed event payload or tool input
    /// - [`AnthropicError::TooManyEmptyStreamMessages`] when the guard trips
    /// - [`AnthropicError::Reqwest`] / [`AnthropicError::Io`] for read errors
    /// - [`AnthropicError::IncompleteStream`] when the body ends before
    ///   `message_stop` and [`StreamOptions::require_message_stop`] is set
    pub async fn assemble<O>(self, observer: &mut O) -> Result<MessagesCreateResponse, AnthropicError>
    where
        O: StreamObserver + ?Sized,
    {
        let mut cursor = EventCursor::new(self.body, self.options);
        let mut assembler = MessageAssembler::new();

        loop {
            let event = match cursor.next_event().await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(e) => return Err(AnthropicError::interrupted(e, assembler.into_message())),
            };

            dispatch(observer, &event);
            let stopped = match &event {
                Event::ContentBlockStop { index } => Some(*index),
                _ => None,
            };
            if let Err(e) = assembler.apply(event) {
                return Err(AnthropicError::interrupted(e, assembler.into_message()));
            }
            if let Some(index) = stopped
                && let Some(block) = assembler.block(index)
            {
                observer.on_content_block_finished(index, block);
            }

            if assembler.is_complete() {
                cursor.discard_buffered();
                return Ok(assembler.into_message());
            }
        }

        if self.options.require_message_stop {
            return Err(AnthropicError::interrupted(
                AnthropicError::IncompleteStream,
                assembler.into_message(),
            ));
        }
        debug!("stream ended without message_stop; returning partial message");
        Ok(assembler.into_message())
    }

    /// [`MessageStream::assemble`] without an observer
    ///
    /// # Errors
    ///
    /// See [`MessageStream::assemble`].
    pub async fn into_message(self) -> Result<MessagesCreateResponse, AnthropicError> {
        self.assemble(&mut NoopObserver).await
    }

    /// Typed events in arrival order
    ///
    /// The stream ends after `message_stop`, after an `error` event (which is
    /// yielded as `Ok`), or after the first `Err`. Lines without a known event
    /// count toward the same guard as in [`MessageStream::assemble`].
    #[must_use]
    pub fn into_events(self) -> EventStream {
        let require_stop = self.options.require_message_stop;
        let cursor = EventCursor::new(self.body, self.options);

        Box::pin(futures::stream::unfold(
            (cursor, false),
            move |(mut cursor, finished)| async move {
                if finished {
                    return None;
                }
                match cursor.next_event().await {
                    Ok(Some(event)) => {
                        let last = matches!(event, Event::MessageStop | Event::Error { .. });
                        Some((Ok(event), (cursor, last)))
                    }
                    Ok(None) if require_stop => {
                        Some((Err(AnthropicError::IncompleteStream), (cursor, true)))
                    }
                    Ok(None) => None,
                    Err(e) => Some((Err(e), (cursor, true))),
                }
            },
        ))
    }
}
