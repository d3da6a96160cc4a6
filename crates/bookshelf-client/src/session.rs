//! [`CatalogSession`] — a viewer's live, filtered copy of the catalog.
//!
//! The session owns a [`Mirror`] and keeps it current from two inputs: full
//! fetches (`refresh`) and change events (`apply`/`follow`). The two are not
//! ordered relative to each other; a fetch that resolves after a
//! later-arriving event overwrites it (last-write-wins, the accepted race).

use anyhow::Result;

use bookshelf_core::{
  book::Book,
  event::ChangeEvent,
  mirror::{Mirror, ReadingStats},
  store::BookFilter,
};

use crate::{changes::ChangeStream, client::ApiClient};

pub struct CatalogSession {
  client: ApiClient,
  filter: BookFilter,
  mirror: Mirror,
}

impl CatalogSession {
  pub fn new(client: ApiClient, filter: BookFilter) -> Self {
    Self {
      client,
      filter,
      mirror: Mirror::new(),
    }
  }

  pub fn books(&self) -> &[Book] {
    self.mirror.books()
  }

  pub fn stats(&self) -> ReadingStats {
    self.mirror.stats()
  }

  /// Full fetch: replaces the mirror wholesale with the server's answer.
  pub async fn refresh(&mut self) -> Result<()> {
    let books = self.client.list_books(&self.filter).await?;
    self.mirror.replace_all(books);
    Ok(())
  }

  /// Reconcile a single change event into the mirror.
  pub fn apply(&mut self, event: &ChangeEvent) {
    self.mirror.apply(event);
  }

  /// Open a change subscription. Pair with [`CatalogSession::follow`].
  pub async fn subscribe(&self) -> Result<ChangeStream> {
    self.client.subscribe_changes().await
  }

  /// Apply events until the stream closes. Events committed while
  /// disconnected are lost, so after this returns the caller should
  /// [`CatalogSession::subscribe`] again and then [`CatalogSession::refresh`]
  /// to resynchronize.
  pub async fn follow(&mut self, stream: &mut ChangeStream) -> Result<()> {
    while let Some(event) = stream.next_event().await? {
      tracing::debug!(book_id = %event.book_id(), "reconciling change event");
      self.mirror.apply(&event);
    }
    Ok(())
  }
}
