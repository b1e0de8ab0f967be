//! Per-kind folding of content block deltas

use super::assembler::BlockSlot;
use super::event::ContentBlockDelta;
use crate::types::content::ContentBlock;

/// Result of folding one delta into a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeOutcome {
    Applied,
    /// The delta targets a different block kind; the block is unchanged
    Mismatch,
}

/// Fold `delta` into the block held by `slot`
pub(crate) fn merge_delta(slot: &mut BlockSlot, delta: ContentBlockDelta) -> MergeOutcome {
    match (&mut slot.block, delta) {
        (ContentBlock::Text { text, .. }, ContentBlockDelta::TextDelta { text: fragment }) => {
            text.push_str(&fragment);
        }
        (ContentBlock::Text { citations, .. }, ContentBlockDelta::CitationsDelta { citation }) => {
            citations.push(citation);
        }
        (ContentBlock::ToolUse { .. }, ContentBlockDelta::InputJsonDelta { partial_json }) => {
            slot.partial_json.push_str(&partial_json);
        }
        (
            ContentBlock::Thinking { thinking, .. },
            ContentBlockDelta::ThinkingDelta { thinking: fragment },
        ) => {
            thinking.push_str(&fragment);
        }
        (
            ContentBlock::Thinking { signature, .. },
            ContentBlockDelta::SignatureDelta {
                signature: fragment,
            },
        ) => {
            signature.push_str(&fragment);
        }
        (ContentBlock::Image { source }, ContentBlockDelta::Image { source: replacement }) => {
            *source = replacement;
        }
        (
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
            ContentBlockDelta::ToolResult {
                tool_use_id: new_id,
                content: new_content,
                is_error: new_is_error,
            },
        ) => {
            if let Some(id) = new_id {
                *tool_use_id = id;
            }
            *content = new_content;
            *is_error = new_is_error;
        }
        _ => return MergeOutcome::Mismatch,
    }
    MergeOutcome::Applied
}

/// Build a block from a delta that arrived before any start event for its index
///
/// Returns `None` for deltas that cannot stand for a whole block.
pub(crate) fn block_from_delta(delta: ContentBlockDelta) -> Option<BlockSlot> {
    let slot = match delta {
        ContentBlockDelta::TextDelta { text } => BlockSlot::new(ContentBlock::text(text)),
        ContentBlockDelta::CitationsDelta { citation } => BlockSlot::new(ContentBlock::Text {
            text: String::new(),
            citations: vec![citation],
        }),
        ContentBlockDelta::InputJsonDelta { partial_json } => BlockSlot {
            block: ContentBlock::ToolUse {
                id: String::new(),
                name: String::new(),
                input: serde_json::Value::Object(serde_json::Map::new()),
            },
            partial_json,
        },
        ContentBlockDelta::ThinkingDelta { thinking } => BlockSlot::new(ContentBlock::Thinking {
            thinking,
            signature: String::new(),
        }),
        ContentBlockDelta::SignatureDelta { signature } => {
            BlockSlot::new(ContentBlock::Thinking {
                thinking: String::new(),
                signature,
            })
        }
        ContentBlockDelta::Image { source } => BlockSlot::new(ContentBlock::Image { source }),
        ContentBlockDelta::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => BlockSlot::new(ContentBlock::ToolResult {
            tool_use_id: tool_use_id.unwrap_or_default(),
            content,
            is_error,
        }),
        ContentBlockDelta::Unknown => return None,
    };
    Some(slot)
}
