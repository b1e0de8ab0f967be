//! Streams a reply and prints text as it arrives.
//!
//! This example demonstrates:
//! - Opening a streamed request
//! - Watching events with a `StreamObserver`
//! - Reading the assembled message and rate limit headers afterwards

use std::io::Write;

use anthropic_sse::{
    AnthropicConfig, Client,
    streaming::{ContentBlockDelta, MessageDelta, MessageDeltaUsage, StreamObserver},
    types::{content::*, messages::*},
};

#[derive(Default)]
struct Printer {
    deltas: usize,
}

impl StreamObserver for Printer {
    fn on_content_block_delta(&mut self, _index: usize, delta: &ContentBlockDelta) {
        self.deltas += 1;
        if let ContentBlockDelta::TextDelta { text } = delta {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
    }

    fn on_content_block_finished(&mut self, _index: usize, block: &ContentBlock) {
        if let ContentBlock::ToolUse { name, input, .. } = block {
            println!("\n[Tool call: {name} {input}]");
        }
    }

    fn on_message_delta(&mut self, delta: &MessageDelta, usage: Option<&MessageDeltaUsage>) {
        if let Some(reason) = &delta.stop_reason {
            println!("\n\n[stop: {reason}]");
        }
        if let Some(usage) = usage {
            println!("[output tokens so far: {}]", usage.output_tokens);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::with_config(AnthropicConfig::new());

    let req = MessagesCreateRequest::builder()
        .model("claude-3-5-sonnet-20240620")
        .max_tokens(256u32)
        .messages(vec![MessageParam::user("Write a short poem about rivers")])
        .temperature(0.7f32)
        .build()?;

    let stream = client.messages().open_stream(req).await?;
    if let Some(id) = stream.request_id() {
        println!("request-id: {id}");
    }
    if let Ok(limits) = stream.rate_limits() {
        println!(
            "tokens remaining: {}/{}",
            limits.tokens_remaining, limits.tokens_limit
        );
    }

    let mut printer = Printer::default();
    let message = stream.assemble(&mut printer).await?;

    println!("\n{} deltas, {} blocks", printer.deltas, message.content.len());
    if let Some(usage) = &message.usage {
        println!("Token usage:");
        println!("  Input: {:?}", usage.input_tokens);
        println!("  Output: {:?}", usage.output_tokens);
    }

    Ok(())
}
