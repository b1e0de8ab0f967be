use tracing::{debug, trace, warn};

use super::event::{ContentBlockDelta, Event, MessageDelta, MessageDeltaUsage};
use super::merge::{MergeOutcome, block_from_delta, merge_delta};
use crate::error::AnthropicError;
use crate::types::common::Usage;
use crate::types::content::ContentBlock;
use crate::types::messages::MessagesCreateResponse;

/// A content block under construction plus its pending tool input fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockSlot {
    pub(crate) block: ContentBlock,
    pub(crate) partial_json: String,
}

impl BlockSlot {
    pub(crate) const fn new(block: ContentBlock) -> Self {
        Self {
            block,
            partial_json: String::new(),
        }
    }
}

/// Lifecycle of a streamed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessagePhase {
    /// No `message_start` seen yet
    #[default]
    Unstarted,
    /// Between `message_start` and `message_stop`
    Open,
    /// `message_stop` seen; later events are ignored
    Closed,
}

/// Incremental builder of a [`MessagesCreateResponse`] from stream events
///
/// Each event kind maps to one transition. The assembler is owned by the call
/// that drives the stream and never shared.
///
/// ```
/// use anthropic_sse::streaming::{Event, MessageAssembler, ContentBlockDelta};
/// use anthropic_sse::types::content::ContentBlock;
///
/// let mut asm = MessageAssembler::new();
/// asm.apply(Event::ContentBlockStart { index: 0, content_block: ContentBlock::text("") })?;
/// asm.apply(Event::ContentBlockDelta {
///     index: 0,
///     delta: ContentBlockDelta::TextDelta { text: "Hello".into() },
/// })?;
/// assert_eq!(asm.current_text(), "Hello");
/// # Ok::<(), anthropic_sse::AnthropicError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageAssembler {
    message: MessagesCreateResponse,
    slots: Vec<BlockSlot>,
    phase: MessagePhase,
}

impl MessageAssembler {
    /// Empty assembler waiting for `message_start`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event
    ///
    /// # Errors
    ///
    /// - [`AnthropicError::Api`] for an `error` event
    /// - [`AnthropicError::Serde`] if a `tool_use` block's accumulated input is
    ///   not valid JSON when the block stops
    pub fn apply(&mut self, event: Event) -> Result<(), AnthropicError> {
        if self.phase == MessagePhase::Closed {
            debug!(event = event.name(), "event after message_stop ignored");
            return Ok(());
        }
        trace!(event = event.name(), "applying stream event");

        match event {
            Event::MessageStart { message } => self.start_message(message),
            Event::ContentBlockStart {
                index,
                content_block,
            } => self.start_block(index, content_block),
            Event::ContentBlockDelta { index, delta } => self.apply_delta(index, delta),
            Event::ContentBlockStop { index } => return self.stop_block(index),
            Event::MessageDelta { delta, usage } => self.update_message(delta, usage),
            Event::MessageStop => self.phase = MessagePhase::Closed,
            Event::Ping => {}
            Event::Error { error } => return Err(AnthropicError::Api(error.into())),
        }
        Ok(())
    }

    fn start_message(&mut self, mut message: MessagesCreateResponse) {
        if self.phase != MessagePhase::Unstarted {
            warn!(id = %message.id, "duplicate message_start ignored");
            return;
        }
        // Blocks received before message_start stay after any seeded content
        let mut slots: Vec<BlockSlot> = std::mem::take(&mut message.content)
            .into_iter()
            .map(BlockSlot::new)
            .collect();
        slots.append(&mut self.slots);
        self.slots = slots;
        self.message = message;
        self.phase = MessagePhase::Open;
    }

    fn start_block(&mut self, index: usize, block: ContentBlock) {
        let at = self.clamp(index);
        self.slots.insert(at, BlockSlot::new(block));
    }

    fn apply_delta(&mut self, index: usize, delta: ContentBlockDelta) {
        if let Some(slot) = self.slots.get_mut(index) {
            let kind = delta.kind();
            if merge_delta(slot, delta) == MergeOutcome::Mismatch {
                debug!(
                    index,
                    delta = kind,
                    block = slot.block.kind(),
                    "delta does not match block kind; ignored"
                );
            }
            return;
        }

        let kind = delta.kind();
        match block_from_delta(delta) {
            Some(slot) => {
                debug!(index, delta = kind, "delta without a started block; synthesizing");
                let at = self.clamp(index);
                self.slots.insert(at, slot);
            }
            None => debug!(index, delta = kind, "unknown delta without a block; ignored"),
        }
    }

    fn stop_block(&mut self, index: usize) -> Result<(), AnthropicError> {
        let Some(slot) = self.slots.get_mut(index) else {
            debug!(index, "content_block_stop without a block");
            return Ok(());
        };
        if let ContentBlock::ToolUse { input, .. } = &mut slot.block {
            let raw = std::mem::take(&mut slot.partial_json);
            if !raw.trim().is_empty() {
                *input = serde_json::from_str(&raw)
                    .map_err(|e| AnthropicError::Serde(format!("tool input JSON: {e}")))?;
            }
        }
        Ok(())
    }

    fn update_message(&mut self, delta: MessageDelta, usage: Option<MessageDeltaUsage>) {
        self.message.stop_reason = delta.stop_reason;
        self.message.stop_sequence = delta.stop_sequence;
        if let Some(u) = usage {
            self.message
                .usage
                .get_or_insert_with(Usage::default)
                .output_tokens = Some(u.output_tokens);
        }
    }

    fn clamp(&self, index: usize) -> usize {
        let len = self.slots.len();
        if index > len {
            warn!(index, len, "content block index out of range; appending");
            return len;
        }
        index
    }

    /// Current lifecycle phase
    #[must_use]
    pub const fn phase(&self) -> MessagePhase {
        self.phase
    }

    /// Whether `message_stop` has been applied
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == MessagePhase::Closed
    }

    /// Number of content blocks so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no content block has arrived yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Content block at `index`
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&ContentBlock> {
        self.slots.get(index).map(|s| &s.block)
    }

    /// Unparsed tool input fragments of the block at `index`
    #[must_use]
    pub fn partial_json(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|s| s.partial_json.as_str())
    }

    /// Concatenated text of all text blocks so far
    #[must_use]
    pub fn current_text(&self) -> String {
        self.slots
            .iter()
            .filter_map(|s| s.block.as_text())
            .collect()
    }

    /// Copy of the message as assembled so far
    #[must_use]
    pub fn snapshot(&self) -> MessagesCreateResponse {
        self.clone().into_message()
    }

    /// Finish and return the message as assembled so far
    #[must_use]
    pub fn into_message(self) -> MessagesCreateResponse {
        MessagesCreateResponse {
            content: self.slots.into_iter().map(|s| s.block).collect(),
            ..self.message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorDetail;

    fn start() -> Event {
        Event::MessageStart {
            message: MessagesCreateResponse {
                id: "msg_1".into(),
                model: "claude-3-5-sonnet-20240620".into(),
                usage: Some(Usage {
                    input_tokens: Some(25),
                    output_tokens: Some(1),
                    ..Usage::default()
                }),
                ..MessagesCreateResponse::default()
            },
        }
    }

    fn text_delta(index: usize, text: &str) -> Event {
        Event::ContentBlockDelta {
            index,
            delta: ContentBlockDelta::TextDelta { text: text.into() },
        }
    }

    #[test]
    fn tool_use_scenario() {
        let mut asm = MessageAssembler::new();
        let events = vec![
            start(),
            Event::ContentBlockStart {
                index: 0,
                content_block: ContentBlock::ToolUse {
                    id: "toolu_1".into(),
                    name: "get_weather".into(),
                    input: serde_json::json!({}),
                },
            },
            Event::ContentBlockDelta {
                index: 0,
                delta: ContentBlockDelta::InputJsonDelta {
                    partial_json: r#"{"location":"#.into(),
                },
            },
            Event::ContentBlockDelta {
                index: 0,
                delta: ContentBlockDelta::InputJsonDelta {
                    partial_json: r#""SF"}"#.into(),
                },
            },
            Event::ContentBlockStop { index: 0 },
            Event::MessageDelta {
                delta: MessageDelta {
                    stop_reason: Some("tool_use".into()),
                    stop_sequence: None,
                },
                usage: Some(MessageDeltaUsage { output_tokens: 40 }),
            },
            Event::MessageStop,
        ];
        for e in events {
            asm.apply(e).unwrap();
        }
        assert!(asm.is_complete());
        assert_eq!(asm.partial_json(0), Some(""));

        let msg = asm.into_message();
        assert_eq!(msg.content.len(), 1);
        assert_eq!(msg.stop_reason.as_deref(), Some("tool_use"));
        let usage = msg.usage.unwrap();
        assert_eq!(usage.input_tokens, Some(25));
        assert_eq!(usage.output_tokens, Some(40));
        match &msg.content[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "get_weather");
                assert_eq!(input, &serde_json::json!({"location": "SF"}));
            }
            other => panic!("Expected tool_use, got {other:?}"),
        }
    }

    #[test]
    fn empty_tool_buffer_keeps_start_input() {
        let mut asm = MessageAssembler::new();
        asm.apply(Event::ContentBlockStart {
            index: 0,
            content_block: ContentBlock::ToolUse {
                id: "toolu_1".into(),
                name: "noop".into(),
                input: serde_json::json!({"preset": true}),
            },
        })
        .unwrap();
        asm.apply(Event::ContentBlockStop { index: 0 }).unwrap();
        assert!(matches!(
            asm.block(0),
            Some(ContentBlock::ToolUse { input, .. }) if input == &serde_json::json!({"preset": true})
        ));
    }

    #[test]
    fn invalid_tool_json_is_fatal() {
        let mut asm = MessageAssembler::new();
        asm.apply(Event::ContentBlockStart {
            index: 0,
            content_block: ContentBlock::ToolUse {
                id: "toolu_1".into(),
                name: "noop".into(),
                input: serde_json::json!({}),
            },
        })
        .unwrap();
        asm.apply(Event::ContentBlockDelta {
            index: 0,
            delta: ContentBlockDelta::InputJsonDelta {
                partial_json: r#"{"location":"#.into(),
            },
        })
        .unwrap();
        match asm.apply(Event::ContentBlockStop { index: 0 }) {
            Err(AnthropicError::Serde(msg)) => assert!(msg.starts_with("tool input JSON")),
            other => panic!("Expected Serde error, got {other:?}"),
        }
    }

    #[test]
    fn positional_insert_shifts_later_blocks() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        asm.apply(Event::ContentBlockStart {
            index: 0,
            content_block: ContentBlock::text("second"),
        })
        .unwrap();
        asm.apply(Event::ContentBlockStart {
            index: 0,
            content_block: ContentBlock::text("first"),
        })
        .unwrap();
        assert_eq!(asm.block(0).and_then(ContentBlock::as_text), Some("first"));
        assert_eq!(asm.block(1).and_then(ContentBlock::as_text), Some("second"));
    }

    #[test]
    fn out_of_range_index_appends() {
        let mut asm = MessageAssembler::new();
        asm.apply(Event::ContentBlockStart {
            index: 5,
            content_block: ContentBlock::text("a"),
        })
        .unwrap();
        asm.apply(text_delta(9, "b")).unwrap();
        assert_eq!(asm.len(), 2);
        assert_eq!(asm.current_text(), "ab");
    }

    #[test]
    fn delta_before_start_synthesizes_block() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        asm.apply(text_delta(0, "Hel")).unwrap();
        asm.apply(text_delta(0, "lo")).unwrap();
        assert_eq!(asm.len(), 1);
        assert_eq!(asm.current_text(), "Hello");

        asm.apply(Event::ContentBlockDelta {
            index: 1,
            delta: ContentBlockDelta::Unknown,
        })
        .unwrap();
        assert_eq!(asm.len(), 1);
    }

    #[test]
    fn message_delta_overwrites() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        for reason in ["max_tokens", "end_turn"] {
            asm.apply(Event::MessageDelta {
                delta: MessageDelta {
                    stop_reason: Some(reason.into()),
                    stop_sequence: None,
                },
                usage: Some(MessageDeltaUsage { output_tokens: 7 }),
            })
            .unwrap();
        }
        let msg = asm.snapshot();
        assert_eq!(msg.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(msg.usage.unwrap().output_tokens, Some(7));
    }

    #[test]
    fn duplicate_message_start_ignored() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        asm.apply(Event::MessageStart {
            message: MessagesCreateResponse {
                id: "msg_2".into(),
                ..MessagesCreateResponse::default()
            },
        })
        .unwrap();
        assert_eq!(asm.snapshot().id, "msg_1");
        assert_eq!(asm.phase(), MessagePhase::Open);
    }

    #[test]
    fn events_after_stop_have_no_effect() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        asm.apply(text_delta(0, "done")).unwrap();
        asm.apply(Event::MessageStop).unwrap();
        asm.apply(text_delta(0, " more")).unwrap();
        asm.apply(Event::Error {
            error: ApiErrorDetail {
                kind: "overloaded_error".into(),
                message: "late".into(),
            },
        })
        .unwrap();
        assert_eq!(asm.current_text(), "done");
    }

    #[test]
    fn error_event_keeps_content() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        asm.apply(text_delta(0, "partial")).unwrap();
        let err = asm
            .apply(Event::Error {
                error: ApiErrorDetail {
                    kind: "overloaded_error".into(),
                    message: "Overloaded".into(),
                },
            })
            .unwrap_err();
        assert!(err.api_error().is_some_and(|e| e.is_overloaded()));
        assert_eq!(asm.into_message().text(), "partial");
    }

    #[test]
    fn ping_has_no_effect() {
        let mut asm = MessageAssembler::new();
        asm.apply(start()).unwrap();
        let before = asm.snapshot();
        asm.apply(Event::Ping).unwrap();
        assert_eq!(asm.snapshot(), before);
    }
}
