//! Server-sent event decoding for streamed replies.
//!
//! The API sends one `data:` line per event, each a JSON
//! [`GenerateResponse`](crate::wire::GenerateResponse). Lines may be split
//! across network chunks, so bytes are buffered until a newline arrives.

use futures::{Stream, StreamExt};

use crate::error::GenAiError;
use crate::wire::decode_response;

/// Splits a byte stream into complete `data:` payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes, returning the payloads of all lines completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if !data.is_empty() {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }
}

/// Text carried by one event payload. `None` for events without text.
pub fn chunk_text(payload: &str) -> Result<Option<String>, GenAiError> {
    if payload == "[DONE]" {
        return Ok(None);
    }
    let text = decode_response(payload)?.text();
    Ok((!text.is_empty()).then_some(text))
}

/// Turn a raw response byte stream into a stream of text chunks.
pub fn text_chunks<S, B>(bytes: S) -> impl Stream<Item = Result<String, GenAiError>>
where
    S: Stream<Item = Result<B, reqwest::Error>>,
    B: AsRef<[u8]>,
{
    let mut decoder = SseDecoder::default();
    bytes
        .map(move |chunk| -> Vec<Result<String, GenAiError>> {
            match chunk {
                Ok(bytes) => decoder
                    .push(bytes.as_ref())
                    .iter()
                    .filter_map(|payload| chunk_text(payload).transpose())
                    .collect(),
                Err(e) => vec![Err(GenAiError::Request(e))],
            }
        })
        .flat_map(futures::stream::iter)
}
