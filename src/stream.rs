//! Streaming support types and utilities.

use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::client::ClientError;

// SSE parsing utilities live in the `sse` module.
// Re-export them here for convenience.
pub use crate::sse::{is_done_marker, parse_sse_line};

/// Frames of one streaming call, in wire order.
///
/// The stream ends after the `[DONE]` marker, or right after the first
/// error. It cannot be restarted; calling the endpoint again issues a new
/// request.
pub type FrameStream<T> = Pin<Box<dyn Stream<Item = Result<T, ClientError>> + Send>>;

/// Feed every frame to `on_frame`, one at a time, on the calling task.
///
/// The next frame is not read until the callback returns. Dropping out on
/// an error also drops the stream, which releases the response body.
pub async fn for_each_frame<T, S>(
    frames: S,
    on_frame: &mut (dyn FnMut(T) + Send),
) -> Result<(), ClientError>
where
    S: Stream<Item = Result<T, ClientError>> + Send,
{
    futures::pin_mut!(frames);

    while let Some(frame) = frames.next().await {
        on_frame(frame?);
    }

    Ok(())
}
