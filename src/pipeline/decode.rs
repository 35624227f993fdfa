//! Server-sent-event framing (Bytes -> SseFrame)
//!
//! Frames are split on blank lines. Each frame keeps its `event:` name (defaulting
//! to `message`, per the event-stream format) and its joined `data:` lines. Payload
//! interpretation happens later, in the reducer.

use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt};

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

impl SseFrame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// Parse one blank-line-delimited block. Comment-only blocks yield `None`.
    pub fn parse(block: &str) -> Option<Self> {
        let mut event: Option<String> = None;
        let mut data: Vec<&str> = Vec::new();

        for line in block.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.find(':') {
                Some(idx) => {
                    let value = &line[idx + 1..];
                    (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
                }
                None => (line, ""),
            };
            match field {
                "event" => event = Some(value.to_string()),
                "data" => data.push(value),
                // id / retry and unknown fields carry nothing we use
                _ => {}
            }
        }

        if event.is_none() && data.is_empty() {
            return None;
        }
        Some(Self {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data: data.join("\n"),
        })
    }
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Incremental SSE decoder.
pub struct SseDecoder;

impl SseDecoder {
    /// Buffer raw bytes and emit complete frames as they close.
    ///
    /// Carriage returns are dropped on the way in so CRLF streams frame the same way.
    /// Buffering is byte-level; multi-byte characters split across chunks survive.
    /// Transport errors are passed through unchanged.
    pub fn decode_stream(input: BoxStream<'static, Bytes>) -> BoxStream<'static, SseFrame> {
        let frames = stream::unfold(
            (input, Vec::<u8>::new(), false),
            |(mut input, mut buf, mut eof)| async move {
                loop {
                    // If we have a full frame in buffer, emit it.
                    if let Some(idx) = find_frame_end(&buf) {
                        let block = String::from_utf8_lossy(&buf[..idx]).into_owned();
                        buf.drain(..idx + 2);
                        if let Some(frame) = SseFrame::parse(&block) {
                            return Some((Ok(frame), (input, buf, eof)));
                        }
                        continue;
                    }

                    if eof {
                        // EOF: a trailing frame without its blank line still counts
                        let block = String::from_utf8_lossy(&buf).into_owned();
                        buf.clear();
                        return SseFrame::parse(&block).map(|f| (Ok(f), (input, buf, eof)));
                    }

                    // Need more data.
                    match input.next().await {
                        Some(Ok(bytes)) => {
                            buf.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                        }
                        Some(Err(e)) => {
                            return Some((Err(e), (input, buf, true)));
                        }
                        None => eof = true,
                    }
                }
            },
        );

        Box::pin(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&'static [u8]]) -> BoxStream<'static, Bytes> {
        let items: Vec<crate::Result<Bytes>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p))).collect();
        Box::pin(stream::iter(items))
    }

    async fn collect(input: BoxStream<'static, Bytes>) -> Vec<SseFrame> {
        SseDecoder::decode_stream(input)
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    #[test]
    fn parses_named_event() {
        let frame = SseFrame::parse("event: response.status\ndata: {\"message\":\"Planning\"}").unwrap();
        assert_eq!(frame.event, "response.status");
        assert_eq!(frame.data, "{\"message\":\"Planning\"}");
    }

    #[test]
    fn multi_line_data_and_default_event() {
        let frame = SseFrame::parse("id: 7\ndata: line one\ndata:line two").unwrap();
        assert_eq!(frame.event, DEFAULT_EVENT);
        assert_eq!(frame.data, "line one\nline two");
    }

    #[test]
    fn comment_blocks_are_dropped() {
        assert_eq!(SseFrame::parse(": keep-alive"), None);
        assert_eq!(SseFrame::parse(""), None);
    }

    #[tokio::test]
    async fn frames_split_across_chunks() {
        let frames = collect(chunks(&[
            b"event: response.text.delta\nda",
            b"ta: {\"text\":\"He\"}\n",
            b"\nevent: response.text.delta\ndata: {\"text\":\"llo\"}\n\n",
        ]))
        .await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "{\"text\":\"He\"}");
        assert_eq!(frames[1].data, "{\"text\":\"llo\"}");
    }

    #[tokio::test]
    async fn crlf_and_split_utf8() {
        // "é" is 0xC3 0xA9; split it across two chunks
        let frames = collect(chunks(&[
            b"event: response.text.delta\r\ndata: {\"text\":\"caf\xC3",
            b"\xA9\"}\r\n\r\n",
        ]))
        .await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"text\":\"café\"}");
    }

    #[tokio::test]
    async fn trailing_frame_without_blank_line() {
        let frames = collect(chunks(&[b"data: [DONE]"])).await;
        assert_eq!(frames, vec![SseFrame::new(DEFAULT_EVENT, "[DONE]")]);
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let items: Vec<crate::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: {}\n\n")),
            Err(crate::Error::Transport(crate::transport::TransportError::Timeout)),
        ];
        let mut frames = SseDecoder::decode_stream(Box::pin(stream::iter(items)));
        assert!(frames.next().await.unwrap().is_ok());
        assert!(frames.next().await.unwrap().is_err());
    }
}
