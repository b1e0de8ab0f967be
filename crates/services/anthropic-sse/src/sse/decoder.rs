use bytes::BytesMut;

/// One `data:` line paired with the most recent `event:` name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name from the last `event:` line, if any was seen
    pub event: Option<String>,
    /// Payload of the `data:` line, trimmed
    pub data: String,
}

/// A classified, non-blank line of the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameItem {
    /// A `data:` line, ready for dispatch
    Frame(SseFrame),
    /// A line with neither an `event:` nor a `data:` prefix
    Unmatched(String),
}

/// Line-oriented SSE decoder
///
/// Bytes are buffered until a `\n` arrives; each complete line is trimmed and
/// classified:
/// - blank lines are skipped (they do not terminate frames)
/// - `event:` lines update the current event name, which persists until the next one
/// - `data:` lines yield a [`SseFrame`] immediately, tagged with the current name
/// - anything else yields [`FrameItem::Unmatched`]
#[derive(Debug, Default)]
pub struct SSEDecoder {
    buffer: BytesMut,
    // bytes of `buffer` already searched for a newline
    scanned: usize,
    event: Option<String>,
}

impl SSEDecoder {
    /// Create a new decoder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes and return the items of every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FrameItem> {
        self.buffer.extend_from_slice(chunk);

        let mut items = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(self.scanned + offset + 1);
            self.scanned = 0;
            items.extend(self.classify(&line));
        }
        self.scanned = self.buffer.len();
        items
    }

    /// Classify the trailing unterminated line, if any
    ///
    /// Call once the byte stream has ended.
    pub fn flush(&mut self) -> Option<FrameItem> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            return None;
        }
        let line = self.buffer.split();
        self.classify(&line)
    }

    /// Event name currently in effect
    #[must_use]
    pub fn current_event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    fn classify(&mut self, raw: &[u8]) -> Option<FrameItem> {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.event = Some(name.trim().to_string());
            None
        } else if let Some(data) = line.strip_prefix("data:") {
            Some(FrameItem::Frame(SseFrame {
                event: self.event.clone(),
                data: data.trim().to_string(),
            }))
        } else {
            Some(FrameItem::Unmatched(line.to_string()))
        }
    }
}
