//! Assembly must not depend on how the body is split into chunks

use anthropic_sse::streaming::{FrameItem, MessageStream, SSEDecoder};
use anthropic_sse::test_support::sse_body;
use anthropic_sse::StreamOptions;
use proptest::prelude::*;
use serde_json::json;

fn body_for(fragments: &[String]) -> String {
    let mut events = vec![
        (
            "message_start",
            json!({
                "type": "message_start",
                "message": {
                    "id": "msg_prop",
                    "type": "message",
                    "role": "assistant",
                    "content": [],
                    "model": "claude-3-5-sonnet-20240620",
                    "usage": {"input_tokens": 1, "output_tokens": 1}
                }
            }),
        ),
        (
            "content_block_start",
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
        ),
    ];
    for fragment in fragments {
        events.push((
            "content_block_delta",
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": fragment}}),
        ));
    }
    events.push(("message_stop", json!({"type": "message_stop"})));
    sse_body(&events)
}

fn split_at_points(body: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = points.iter().map(|p| p % (body.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(body[start..cut].to_vec());
        start = cut;
    }
    chunks.push(body[start..].to_vec());
    chunks
}

proptest! {
    #[test]
    fn assembled_text_is_independent_of_chunking(
        fragments in prop::collection::vec("[a-zA-Z0-9 é漢]{0,8}", 1..12),
        points in prop::collection::vec(any::<usize>(), 0..20),
    ) {
        let body = body_for(&fragments);
        let chunks = split_at_points(body.as_bytes(), &points);
        let stream = MessageStream::from_byte_stream(
            futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>)),
            StreamOptions::default(),
        );

        let msg = futures::executor::block_on(stream.into_message()).unwrap();
        prop_assert_eq!(msg.text(), fragments.concat());
        prop_assert_eq!(msg.content.len(), 1);
    }

    #[test]
    fn decoder_frames_are_independent_of_chunking(
        fragments in prop::collection::vec("[a-z]{0,5}", 1..6),
        points in prop::collection::vec(any::<usize>(), 0..10),
    ) {
        let body = body_for(&fragments);
        let decode = |chunks: Vec<Vec<u8>>| {
            let mut decoder = SSEDecoder::new();
            let mut items: Vec<FrameItem> = chunks.iter().flat_map(|c| decoder.push(c)).collect();
            items.extend(decoder.flush());
            items
        };

        let whole = decode(vec![body.as_bytes().to_vec()]);
        let split = decode(split_at_points(body.as_bytes(), &points));
        prop_assert_eq!(whole, split);
    }
}
