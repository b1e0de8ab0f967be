use super::event::{ContentBlockDelta, Event, MessageDelta, MessageDeltaUsage};
use crate::error::ApiErrorDetail;
use crate::types::content::ContentBlock;
use crate::types::messages::MessagesCreateResponse;

/// Read-only hooks called while a streamed message is assembled
///
/// Every method defaults to doing nothing, so implementors override only the
/// events they care about. Hooks run after an event is decoded and before it is
/// applied, except [`StreamObserver::on_content_block_finished`] which runs
/// after the block has been closed.
pub trait StreamObserver {
    /// `message_start`
    fn on_message_start(&mut self, _message: &MessagesCreateResponse) {}

    /// `content_block_start`
    fn on_content_block_start(&mut self, _index: usize, _block: &ContentBlock) {}

    /// `ping`
    fn on_ping(&mut self) {}

    /// `content_block_delta`
    fn on_content_block_delta(&mut self, _index: usize, _delta: &ContentBlockDelta) {}

    /// `content_block_stop`
    fn on_content_block_stop(&mut self, _index: usize) {}

    /// The block at `index` after its stop event was applied; a `tool_use`
    /// block carries its parsed input here
    fn on_content_block_finished(&mut self, _index: usize, _block: &ContentBlock) {}

    /// `message_delta`
    fn on_message_delta(&mut self, _delta: &MessageDelta, _usage: Option<&MessageDeltaUsage>) {}

    /// `message_stop`
    fn on_message_stop(&mut self) {}

    /// `error`; the stream ends right after this hook
    fn on_error(&mut self, _error: &ApiErrorDetail) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StreamObserver for NoopObserver {}

/// Route a decoded event to its hook
pub(crate) fn dispatch<O: StreamObserver + ?Sized>(observer: &mut O, event: &Event) {
    match event {
        Event::MessageStart { message } => observer.on_message_start(message),
        Event::ContentBlockStart {
            index,
            content_block,
        } => observer.on_content_block_start(*index, content_block),
        Event::ContentBlockDelta { index, delta } => observer.on_content_block_delta(*index, delta),
        Event::ContentBlockStop { index } => observer.on_content_block_stop(*index),
        Event::MessageDelta { delta, usage } => observer.on_message_delta(delta, usage.as_ref()),
        Event::MessageStop => observer.on_message_stop(),
        Event::Ping => observer.on_ping(),
        Event::Error { error } => observer.on_error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl StreamObserver for Recorder {
        fn on_ping(&mut self) {
            self.0.push("ping".into());
        }

        fn on_content_block_delta(&mut self, index: usize, delta: &ContentBlockDelta) {
            self.0.push(format!("delta {index} {}", delta.kind()));
        }
    }

    #[test]
    fn dispatch_routes_to_overridden_hooks_only() {
        let mut rec = Recorder::default();
        dispatch(&mut rec, &Event::Ping);
        dispatch(&mut rec, &Event::MessageStop);
        dispatch(
            &mut rec,
            &Event::ContentBlockDelta {
                index: 2,
                delta: ContentBlockDelta::TextDelta { text: "x".into() },
            },
        );
        assert_eq!(rec.0, ["ping", "delta 2 text_delta"]);
    }

    #[test]
    fn dyn_observer_dispatch() {
        let mut rec = Recorder::default();
        let obs: &mut dyn StreamObserver = &mut rec;
        dispatch(obs, &Event::Ping);
        assert_eq!(rec.0, ["ping"]);
    }
}
