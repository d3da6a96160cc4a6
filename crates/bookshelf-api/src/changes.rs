//! `GET /changes` — the change feed as a server-sent-event stream.
//!
//! Each event's `data` field is one JSON-encoded
//! [`ChangeEvent`](bookshelf_core::event::ChangeEvent). Delivery matches
//! commit order for as long as the connection lives. A subscriber that lags
//! past the feed capacity has its stream closed; on reconnect it must
//! re-fetch full state — there is no catch-up log.

use std::sync::Arc;

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{
  StreamExt as _,
  wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use bookshelf_core::store::BookStore;

/// `GET /changes`
pub async fn subscribe<S>(
  State(store): State<Arc<S>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>
where
  S: BookStore,
{
  let rx = store.subscribe();
  tracing::debug!("change subscriber connected");

  let stream = BroadcastStream::new(rx)
    .take_while(|result| match result {
      Err(BroadcastStreamRecvError::Lagged(missed)) => {
        tracing::warn!(missed, "change subscriber lagged; closing stream");
        false
      }
      Ok(_) => true,
    })
    .filter_map(Result::ok)
    .map(|event| Event::default().json_data(&event));

  Sse::new(stream).keep_alive(KeepAlive::default())
}
