//! [`ChangeFeed`] — the broadcast channel carrying committed book mutations.
//!
//! One event is published per committed INSERT/UPDATE/DELETE, in commit
//! order. Each subscriber holds an independent receiver; a receiver that
//! falls more than the channel capacity behind is disconnected by the
//! channel and must re-fetch full state, matching the no-replay contract.

use bookshelf_core::event::ChangeEvent;
use tokio::sync::broadcast;

/// Events buffered per lagging subscriber before it is disconnected.
const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ChangeFeed {
  tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
  fn default() -> Self {
    Self::new()
  }
}

impl ChangeFeed {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(FEED_CAPACITY);
    Self { tx }
  }

  /// Publish a committed mutation to all active subscribers.
  ///
  /// With no subscribers the event is dropped; events committed while a
  /// subscriber is disconnected are never redelivered.
  pub fn publish(&self, event: ChangeEvent) {
    tracing::debug!(book_id = %event.book_id(), "publishing change event");
    if self.tx.send(event).is_err() {
      tracing::debug!("no active change subscribers");
    }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
    self.tx.subscribe()
  }
}
