use futures_util::StreamExt;
use memchr::memchr;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::client::{summarize_api_error, GeminiClient};
use crate::api::{chat_safety_settings, Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::constants::system_instruction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

type StreamSender = mpsc::UnboundedSender<(StreamMessage, u64)>;

/// A conversation request carrying the Scripture-scoped system prompt.
pub fn chat_request(contents: Vec<Content>, bible_version: &str, language: &str) -> GenerateContentRequest {
    GenerateContentRequest::conversation(contents)
        .with_system_instruction(system_instruction(bible_version, language))
        .with_safety_settings(chat_safety_settings())
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn send_error_and_end(tx: &StreamSender, message: String, stream_id: u64) {
    let _ = tx.send((StreamMessage::Error(message), stream_id));
    let _ = tx.send((StreamMessage::End, stream_id));
}

/// Handle one `data:` payload. Returns true when the stream is finished.
fn handle_data_payload(payload: &str, tx: &StreamSender, stream_id: u64) -> bool {
    if payload.trim().is_empty() {
        return false;
    }

    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(_) => {
            send_error_and_end(tx, summarize_api_error(payload), stream_id);
            return true;
        }
    };

    if value.get("error").is_some() {
        send_error_and_end(tx, summarize_api_error(payload), stream_id);
        return true;
    }

    match serde_json::from_value::<GenerateContentResponse>(value) {
        Ok(response) => {
            let text = response.text();
            if !text.is_empty() {
                let _ = tx.send((StreamMessage::Chunk(text), stream_id));
            }
            if let Some(reason) = response.block_reason() {
                send_error_and_end(tx, format!("Response blocked ({reason})"), stream_id);
                return true;
            }
            false
        }
        Err(err) => {
            warn!(stream_id, "unexpected stream payload: {err}");
            false
        }
    }
}

fn process_sse_line(line: &str, tx: &StreamSender, stream_id: u64) -> bool {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, tx, stream_id))
        .unwrap_or(false)
}

/// Split complete lines off the front of `buffer` and feed them through the
/// SSE handler. Returns true once a terminal message has been sent.
fn drain_lines(buffer: &mut Vec<u8>, tx: &StreamSender, stream_id: u64) -> bool {
    while let Some(newline_pos) = memchr(b'\n', buffer) {
        let should_end = match std::str::from_utf8(&buffer[..newline_pos]) {
            Ok(line) => process_sse_line(line.trim(), tx, stream_id),
            Err(err) => {
                warn!(stream_id, "invalid UTF-8 in stream: {err}");
                false
            }
        };
        buffer.drain(..=newline_pos);
        if should_end {
            return true;
        }
    }
    false
}

pub struct StreamParams {
    pub client: GeminiClient,
    pub request: GenerateContentRequest,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: StreamSender,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                request,
                stream_id,
            } = params;

            debug!(stream_id, model = client.model(), "opening stream");
            let response = match client.stream_request(&request).send().await {
                Ok(response) => response,
                Err(err) => {
                    send_error_and_end(&tx, err.to_string(), stream_id);
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no body>".to_string());
                debug!(stream_id, %status, "stream rejected");
                send_error_and_end(&tx, summarize_api_error(&error_text), stream_id);
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        if drain_lines(&mut buffer, &tx, stream_id) {
                            return;
                        }
                    }
                    Err(err) => {
                        send_error_and_end(&tx, err.to_string(), stream_id);
                        return;
                    }
                }
            }

            // The body may close without a trailing newline.
            if !buffer.is_empty() {
                buffer.push(b'\n');
                if drain_lines(&mut buffer, &tx, stream_id) {
                    return;
                }
            }

            let _ = tx.send((StreamMessage::End, stream_id));
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_sse_line_handles_spacing_variants() {
        let (service, mut rx) = ChatStreamService::new();
        let lines = [
            r#"data: {"candidates":[{"content":{"parts":[{"text":"Blessed "}],"role":"model"}}]}"#,
            r#"data:{"candidates":[{"content":{"parts":[{"text":"are the meek"}],"role":"model"}}]}"#,
        ];

        for line in lines {
            assert!(!process_sse_line(line, &service.tx, 7));
        }

        let chunks: Vec<StreamMessage> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|(message, id)| {
                assert_eq!(id, 7);
                message
            })
            .collect();
        assert_eq!(
            chunks,
            vec![
                StreamMessage::Chunk("Blessed ".into()),
                StreamMessage::Chunk("are the meek".into())
            ]
        );
    }

    #[test]
    fn non_data_lines_and_empty_candidates_are_ignored() {
        let (service, mut rx) = ChatStreamService::new();
        assert!(!process_sse_line(": keep-alive", &service.tx, 1));
        assert!(!process_sse_line("", &service.tx, 1));
        assert!(!process_sse_line(
            r#"data: {"candidates":[{"finishReason":"STOP"}]}"#,
            &service.tx,
            1
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn process_sse_line_routes_stream_errors() {
        let (service, mut rx) = ChatStreamService::new();
        let error_line = r#"data: {"error":{"code":503,"message":"The model is overloaded."}}"#;

        assert!(process_sse_line(error_line, &service.tx, 99));

        let (message, id) = rx.try_recv().expect("error message");
        assert_eq!(id, 99);
        assert_eq!(message, StreamMessage::Error("The model is overloaded.".into()));
        let (message, _) = rx.try_recv().expect("end message");
        assert_eq!(message, StreamMessage::End);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn blocked_prompts_end_the_stream() {
        let (service, mut rx) = ChatStreamService::new();
        let line = r#"data: {"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(process_sse_line(line, &service.tx, 3));
        let (message, _) = rx.try_recv().expect("error");
        assert_eq!(message, StreamMessage::Error("Response blocked (SAFETY)".into()));
    }

    #[test]
    fn drain_lines_keeps_partial_tail() {
        let (service, mut rx) = ChatStreamService::new();
        let mut buffer = b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Amen\"}]}}]}\r\n\r\ndata: {\"cand".to_vec();

        assert!(!drain_lines(&mut buffer, &service.tx, 5));
        assert_eq!(buffer, b"data: {\"cand");
        let (message, _) = rx.try_recv().expect("chunk");
        assert_eq!(message, StreamMessage::Chunk("Amen".into()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn garbage_payload_becomes_error() {
        let (service, mut rx) = ChatStreamService::new();
        assert!(process_sse_line("data: upstream connect error", &service.tx, 2));
        let (message, _) = rx.try_recv().expect("error");
        assert_eq!(message, StreamMessage::Error("upstream connect error".into()));
    }
}
