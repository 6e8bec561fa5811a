//! Server-sent-events decoding for OpenAI-style completion streams.
//!
//! The body is a sequence of `data: {json}` lines terminated by
//! `data: [DONE]`. Network chunks split lines (and UTF-8 sequences)
//! arbitrarily, so bytes are buffered until a full line is available.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ProviderError;

use super::DeltaStream;

/// Longest line accepted before the stream is rejected.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Line-oriented `data:` field extractor.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no `\n`.
    scanned: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer `chunk` and return the `data:` payloads of every line it
    /// completed. Fails once an unterminated line exceeds
    /// [`MAX_LINE_BYTES`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, ProviderError> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(offset) = self.buf[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            let line: Vec<u8> = self.buf.drain(..=end).collect();
            self.scanned = 0;
            if let Some(data) = data_field(&line[..line.len() - 1]) {
                out.push(data);
            }
        }
        self.scanned = self.buf.len();
        if self.buf.len() > MAX_LINE_BYTES {
            return Err(ProviderError::Stream(format!(
                "event line exceeds {MAX_LINE_BYTES} bytes"
            )));
        }
        Ok(out)
    }

    /// Flush a final line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        data_field(&rest)
    }
}

fn data_field(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let value = line.strip_prefix(b"data:")?;
    let value = value.strip_prefix(b" ").unwrap_or(value);
    Some(String::from_utf8_lossy(value).into_owned())
}

/// What one `data:` payload means for the relay.
#[derive(Debug, PartialEq, Eq)]
pub enum SseEvent {
    Delta(String),
    Done,
    Skip,
}

#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Interpret a single `data:` payload.
pub fn parse_event(data: &str) -> Result<SseEvent, ProviderError> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(SseEvent::Skip);
    }
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let payload: ChunkPayload = match serde_json::from_str(data) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "skipping unparseable completion chunk");
            return Ok(SseEvent::Skip);
        }
    };

    if let Some(err) = payload.error {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| err.to_string());
        return Err(ProviderError::Stream(message));
    }

    let content = payload
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .unwrap_or_default();

    if content.is_empty() {
        Ok(SseEvent::Skip)
    } else {
        Ok(SseEvent::Delta(content))
    }
}

struct RelayState {
    inner: stream::BoxStream<'static, Result<Bytes, ProviderError>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    eof: bool,
    done: bool,
}

/// Decode a raw SSE byte stream into non-empty completion deltas.
///
/// The stream ends at `[DONE]` or end of body. The first transport or
/// in-band error is yielded and then the stream ends.
pub fn delta_stream<S, E>(body: S) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ProviderError> + 'static,
{
    let state = RelayState {
        inner: body.map(|r| r.map_err(Into::into)).boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        eof: false,
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if st.done {
                return None;
            }

            if let Some(data) = st.pending.pop_front() {
                match parse_event(&data) {
                    Ok(SseEvent::Delta(text)) => return Some((Ok(text), st)),
                    Ok(SseEvent::Skip) => continue,
                    Ok(SseEvent::Done) => {
                        debug!("completion stream finished");
                        st.done = true;
                        return None;
                    }
                    Err(e) => {
                        st.done = true;
                        return Some((Err(e), st));
                    }
                }
            }

            if st.eof {
                return None;
            }

            match st.inner.next().await {
                Some(Ok(bytes)) => match st.decoder.feed(&bytes) {
                    Ok(events) => st.pending.extend(events),
                    Err(e) => {
                        st.done = true;
                        return Some((Err(e), st));
                    }
                },
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(e), st));
                }
                None => {
                    st.eof = true;
                    if let Some(data) = st.decoder.finish() {
                        st.pending.push_back(data);
                    }
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use proptest::prelude::*;

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": content } }] })
        )
    }

    fn body(parts: Vec<Vec<u8>>) -> impl Stream<Item = Result<Bytes, ProviderError>> + Send + 'static {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from(p))))
    }

    async fn collect(parts: Vec<Vec<u8>>) -> Result<Vec<String>, ProviderError> {
        delta_stream(body(parts)).try_collect().await
    }

    #[test]
    fn decoder_joins_split_lines() {
        let mut d = SseDecoder::new();
        assert!(d.feed(b"data: he").unwrap().is_empty());
        assert!(d.feed(b"l").unwrap().is_empty());
        assert_eq!(d.feed(b"lo\r\n\ndata: x\n").unwrap(), vec!["hello".to_owned(), "x".to_owned()]);
    }

    #[test]
    fn decoder_ignores_non_data_fields() {
        let mut d = SseDecoder::new();
        assert!(d.feed(b": keep-alive\nevent: ping\n\n").unwrap().is_empty());
    }

    #[test]
    fn decoder_rejects_an_unbounded_line() {
        let mut d = SseDecoder::new();
        let piece = vec![b'a'; 64 * 1024];
        let mut result = Ok(Vec::new());
        for _ in 0..=(MAX_LINE_BYTES / piece.len()) {
            result = d.feed(&piece);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(ProviderError::Stream(_))));
    }

    #[tokio::test]
    async fn oversized_line_ends_the_stream_with_an_error() {
        let mut parts = vec![chunk("before").into_bytes()];
        parts.push(b"data: ".to_vec());
        parts.extend(std::iter::repeat_n(vec![b'x'; 256 * 1024], 5));
        let items: Vec<_> = delta_stream(body(parts)).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "before");
        assert!(matches!(items[1], Err(ProviderError::Stream(_))));
    }

    #[test]
    fn done_and_empty_deltas() {
        assert_eq!(parse_event("[DONE]").unwrap(), SseEvent::Done);
        assert_eq!(
            parse_event(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            SseEvent::Skip
        );
        assert_eq!(parse_event(r#"{"choices":[]}"#).unwrap(), SseEvent::Skip);
    }

    #[test]
    fn in_band_error_is_an_error() {
        let err = parse_event(r#"{"error":{"message":"overloaded"}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Stream(m) if m == "overloaded"));
    }

    #[tokio::test]
    async fn relays_deltas_in_order_and_stops_at_done() {
        let raw = format!("{}{}data: [DONE]\n\n{}", chunk("Hel"), chunk("lo"), chunk("ignored"));
        let deltas = collect(vec![raw.into_bytes()]).await.unwrap();
        assert_eq!(deltas, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn trailing_line_without_newline_is_flushed() {
        let raw = format!("{}data: {}", chunk("a"), r#"{"choices":[{"delta":{"content":"b"}}]}"#);
        let deltas = collect(vec![raw.into_bytes()]).await.unwrap();
        assert_eq!(deltas, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn transport_error_terminates_stream() {
        let parts: Vec<Result<Bytes, ProviderError>> = vec![
            Ok(Bytes::from(chunk("first"))),
            Err(ProviderError::Stream("connection reset".into())),
            Ok(Bytes::from(chunk("never"))),
        ];
        let items: Vec<_> = delta_stream(stream::iter(parts)).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "first");
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn multibyte_characters_survive_any_split() {
        let raw = chunk("héllo wörld").into_bytes();
        for split in 1..raw.len() {
            let parts = vec![raw[..split].to_vec(), raw[split..].to_vec()];
            assert_eq!(collect(parts).await.unwrap(), vec!["héllo wörld"], "split at {split}");
        }
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_output(
            deltas in proptest::collection::vec("[a-zA-Z0-9 ]{1,8}", 1..8),
            cuts in proptest::collection::vec(1usize..16, 0..12),
        ) {
            let raw: Vec<u8> = deltas.iter().map(|d| chunk(d)).collect::<String>().into_bytes();
            let mut parts = Vec::new();
            let mut rest = raw.as_slice();
            for cut in cuts {
                if rest.is_empty() { break; }
                let at = cut.min(rest.len());
                parts.push(rest[..at].to_vec());
                rest = &rest[at..];
            }
            if !rest.is_empty() { parts.push(rest.to_vec()); }

            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let out = rt.block_on(collect(parts)).unwrap();
            prop_assert_eq!(out, deltas);
        }
    }
}
