//! Server-Sent Events (SSE) stream decoding.
//!
//! Streaming endpoints answer with newline-delimited events:
//! ```text
//! data: {"key": "value"}
//!
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```
//!
//! Lines that do not start with `data: ` (blank separators, comments,
//! keep-alives) are skipped. `data: [DONE]` is the only successful end;
//! a body that closes before it yields [`ClientError::UnexpectedEof`].
//! After the first error a stream yields nothing more.

use bytes::BytesMut;
use futures::future;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::client::ClientError;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use gpt_client::sse::SSEResponseExt;
///
/// let response = http.post(url).send().await?;
/// let mut events = response.sse_events::<CompletionResponse>();
/// while let Some(event) = events.next().await {
///     println!("{:?}", event?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response into a stream of raw `data: ` payloads.
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send;

    /// Convert the response into a stream of decoded JSON events.
    fn sse_events<T>(self) -> impl Stream<Item = Result<T, ClientError>> + Send
    where
        T: DeserializeOwned + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        sse_data(self.bytes_stream().map_err(ClientError::Stream))
    }

    fn sse_events<T>(self) -> impl Stream<Item = Result<T, ClientError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        decode_events(self.sse())
    }
}

/// Split a byte stream into SSE data payloads.
///
/// Bytes are buffered until a full `\n`-terminated line is available, so
/// chunk boundaries may fall anywhere, including inside a UTF-8 sequence.
/// A trailing line without its newline is not processed.
pub fn sse_data<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Into<ClientError> + Send,
{
    stream::unfold(
        (Box::pin(byte_stream), BytesMut::new(), 0usize, false),
        |(mut byte_stream, mut buffer, mut scanned, finished)| async move {
            if finished {
                return None;
            }

            loop {
                // Drain every complete line already buffered. `scanned` bytes
                // at the front are known to hold no newline.
                while let Some(pos) = buffer[scanned..].iter().position(|b| *b == b'\n') {
                    let raw = buffer.split_to(scanned + pos + 1);
                    scanned = 0;

                    let Some(payload) = data_payload(&raw) else {
                        continue;
                    };
                    let data = match std::str::from_utf8(payload) {
                        Ok(data) => data.trim(),
                        Err(e) => return Some((Err(e.into()), (byte_stream, buffer, 0, true))),
                    };

                    if is_done_marker(data) {
                        debug!("event stream completed");
                        return None;
                    }

                    trace!(data, "event stream frame");
                    return Some((Ok(data.to_string()), (byte_stream, buffer, 0, false)));
                }
                scanned = buffer.len();

                match byte_stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                    Some(Err(e)) => return Some((Err(e.into()), (byte_stream, buffer, scanned, true))),
                    None => {
                        debug!(pending = buffer.len(), "event stream closed before [DONE]");
                        return Some((Err(ClientError::UnexpectedEof), (byte_stream, buffer, scanned, true)));
                    }
                }
            }
        },
    )
}

/// Strip surrounding ASCII whitespace and the `data: ` prefix from a raw
/// line. Lines without the prefix give `None` and are never decoded, so
/// a comment carrying arbitrary bytes is still skipped.
fn data_payload(raw: &[u8]) -> Option<&[u8]> {
    let start = raw.iter().position(|b| !b.is_ascii_whitespace())?;
    let end = raw.iter().rposition(|b| !b.is_ascii_whitespace())? + 1;
    raw[start..end].strip_prefix(DATA_PREFIX.as_bytes())
}

/// Decode each data payload as one JSON value of type `T`.
///
/// A payload that fails to decode ends the stream with a
/// `invalid json stream data` error.
pub fn decode_events<T, S>(data: S) -> impl Stream<Item = Result<T, ClientError>> + Send
where
    T: DeserializeOwned + Send,
    S: Stream<Item = Result<String, ClientError>> + Send,
{
    data.map(|result| {
        result.and_then(|payload| {
            serde_json::from_str::<T>(&payload)
                .map_err(|e| ClientError::decode("invalid json stream data", e))
        })
    })
    .scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        *failed = item.is_err();
        future::ready(Some(item))
    })
}

/// Parse an SSE line to extract the data portion.
///
/// SSE lines are in the format: `data: <content>`
///
/// # Example
/// ```
/// use gpt_client::sse::parse_sse_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_sse_line(line), Some("{\"key\": \"value\"}"));
///
/// let line = ": keep-alive";
/// assert_eq!(parse_sse_line(line), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(|s| s.trim())
}

/// Check if an SSE data payload is the end-of-stream marker.
///
/// # Example
/// ```
/// use gpt_client::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker(""));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == DONE_MARKER
}
