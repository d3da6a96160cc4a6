//! Consuming the `/changes` server-sent-event stream.
//!
//! [`SseDecoder`] is a transport-free incremental decoder: bytes in, change
//! events out, tolerant of frames split across chunk boundaries.
//! [`ChangeStream`] drives it from a live HTTP response body.

use std::pin::Pin;

use anyhow::{Context, Result};
use futures_util::{Stream, StreamExt as _};

use bookshelf_core::event::ChangeEvent;

// ─── Decoder ─────────────────────────────────────────────────────────────────

/// Incremental decoder for SSE frames carrying JSON-encoded change events.
///
/// Comment/keep-alive frames (no `data:` line) are skipped silently.
#[derive(Debug, Default)]
pub struct SseDecoder {
  buffer: Vec<u8>,
}

impl SseDecoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Feed raw bytes from the wire. Chunks may split frames, lines, and even
  /// UTF-8 sequences arbitrarily.
  pub fn push(&mut self, chunk: &[u8]) {
    self.buffer.extend_from_slice(chunk);
  }

  /// Pop the next complete event, if a full frame has been buffered.
  pub fn pop(&mut self) -> Result<Option<ChangeEvent>> {
    loop {
      let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") else {
        return Ok(None);
      };

      let frame = std::str::from_utf8(&self.buffer[..end])
        .context("change stream frame is not valid UTF-8")?
        .to_owned();
      self.buffer.drain(..end + 2);

      // Per the SSE grammar: concatenate data lines, ignore everything else
      // (comments, event names, retry hints).
      let data = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect::<Vec<_>>()
        .join("\n");

      if data.is_empty() {
        continue;
      }
      let event =
        serde_json::from_str(&data).context("decoding change event")?;
      return Ok(Some(event));
    }
  }
}

// ─── Stream ──────────────────────────────────────────────────────────────────

/// A live subscription to the server's change feed.
///
/// `next_event` returning `Ok(None)` means the server closed the stream;
/// events committed while disconnected are not redelivered, so the caller
/// must resubscribe and re-fetch full state.
pub struct ChangeStream {
  bytes:   Pin<Box<dyn Stream<Item = reqwest::Result<Vec<u8>>> + Send>>,
  decoder: SseDecoder,
}

impl ChangeStream {
  pub(crate) fn new(resp: reqwest::Response) -> Self {
    let bytes = resp.bytes_stream().map(|chunk| chunk.map(|b| b.to_vec()));
    Self {
      bytes:   Box::pin(bytes),
      decoder: SseDecoder::new(),
    }
  }

  /// Await the next change event, in commit order.
  pub async fn next_event(&mut self) -> Result<Option<ChangeEvent>> {
    loop {
      if let Some(event) = self.decoder.pop()? {
        return Ok(Some(event));
      }
      match self.bytes.next().await {
        Some(chunk) => {
          let chunk = chunk.context("reading change stream")?;
          self.decoder.push(&chunk);
        }
        None => {
          tracing::debug!("change stream closed by server");
          return Ok(None);
        }
      }
    }
  }
}
