//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::api::client::GeminiClient;
use crate::api::Content;
use crate::core::app::Preferences;
use crate::core::chat_stream::{chat_request, ChatStreamService, StreamMessage, StreamParams};
use crate::core::message::Role;

const SAY_STREAM_ID: u64 = 1;

pub async fn run_say(
    prompt: &str,
    client: GeminiClient,
    prefs: &Preferences,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        eprintln!("Usage: bible-expert say <question>");
        std::process::exit(1);
    }

    let request = chat_request(
        vec![Content::text(Role::User.as_str(), prompt)],
        &prefs.bible_version,
        &prefs.language,
    );

    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(StreamParams {
        client,
        request,
        stream_id: SAY_STREAM_ID,
    });

    let mut stdout = io::stdout();
    match write_stream(&mut rx, &mut stdout).await {
        Ok(reply) => {
            debug!(chars = reply.len(), "say finished");
            Ok(())
        }
        Err(message) => {
            warn!("say failed: {message}");
            eprintln!("\n\n❌ Error: {message}");
            std::process::exit(1);
        }
    }
}

/// Copy chunks to `out` as they arrive. Returns the full reply, or the
/// stream's error message.
async fn write_stream<W: Write>(
    rx: &mut UnboundedReceiver<(StreamMessage, u64)>,
    out: &mut W,
) -> Result<String, String> {
    let mut reply = String::new();
    while let Some((message, _)) = rx.recv().await {
        match message {
            StreamMessage::Chunk(content) => {
                reply.push_str(&content);
                write!(out, "{content}")
                    .and_then(|_| out.flush())
                    .map_err(|err| err.to_string())?;
            }
            StreamMessage::Error(err) => return Err(err),
            StreamMessage::End => break,
        }
    }
    writeln!(out).map_err(|err| err.to_string())?;
    Ok(reply)
}
