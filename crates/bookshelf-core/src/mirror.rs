//! Client-side projection of the book collection.
//!
//! A [`Mirror`] is a read-optimised copy held by an active viewer, never the
//! source of truth. It is reconciled incrementally from change events and
//! wholesale from full list fetches. A fetch that lands after a
//! later-arriving event overwrites that event's effect; last-write-wins is
//! the accepted behavior.

use serde::Serialize;

use crate::{
  book::{Book, ReadingStatus},
  event::ChangeEvent,
};

// ─── Mirror ──────────────────────────────────────────────────────────────────

/// In-memory ordered book collection, keyed by id, most-recent-first.
#[derive(Debug, Clone, Default)]
pub struct Mirror {
  books: Vec<Book>,
}

impl Mirror {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn books(&self) -> &[Book] {
    &self.books
  }

  pub fn len(&self) -> usize {
    self.books.len()
  }

  pub fn is_empty(&self) -> bool {
    self.books.is_empty()
  }

  pub fn get(&self, id: uuid::Uuid) -> Option<&Book> {
    self.books.iter().find(|b| b.id == id)
  }

  /// Replace the whole mirror with the result of a full fetch.
  /// Last-fetch-wins: any previously reconciled state is discarded.
  pub fn replace_all(&mut self, books: Vec<Book>) {
    self.books = books;
  }

  /// Reconcile one incoming change event.
  ///
  /// - INSERT prepends (most-recent-first by construction, not re-sorted).
  /// - UPDATE replaces the matching element; with no match the event is
  ///   silently dropped — no implicit insert-on-update.
  /// - DELETE removes the matching element; no-op if absent.
  pub fn apply(&mut self, event: &ChangeEvent) {
    match event {
      ChangeEvent::Insert(book) => self.books.insert(0, book.clone()),
      ChangeEvent::Update(book) => {
        if let Some(slot) = self.books.iter_mut().find(|b| b.id == book.id) {
          *slot = book.clone();
        }
      }
      ChangeEvent::Delete(deleted) => {
        self.books.retain(|b| b.id != deleted.id);
      }
    }
  }

  /// Aggregate reading statistics over the mirrored collection.
  pub fn stats(&self) -> ReadingStats {
    let mut stats = ReadingStats::default();
    for book in &self.books {
      stats.total += 1;
      stats.pages_read += u64::from(book.pages_read);
      match book.status {
        ReadingStatus::WantToRead => stats.want_to_read += 1,
        ReadingStatus::Reading => stats.reading += 1,
        ReadingStatus::Finished => stats.finished += 1,
      }
    }
    stats
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Dashboard-style aggregates computed from a [`Mirror`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadingStats {
  pub total:        usize,
  pub want_to_read: usize,
  pub reading:      usize,
  pub finished:     usize,
  pub pages_read:   u64,
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::event::DeletedBook;

  fn book(title: &str) -> Book {
    Book {
      id:         Uuid::new_v4(),
      title:      title.into(),
      author:     "Autor".into(),
      genre:      String::new(),
      year:       2000,
      pages:      100,
      pages_read: 0,
      status:     ReadingStatus::WantToRead,
      rating:     0,
      synopsis:   String::new(),
      cover:      String::new(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
      owner:      None,
    }
  }

  #[test]
  fn insert_prepends() {
    let mut mirror = Mirror::new();
    let first = book("primeiro");
    let second = book("segundo");

    mirror.apply(&ChangeEvent::Insert(first.clone()));
    mirror.apply(&ChangeEvent::Insert(second.clone()));

    assert_eq!(mirror.books()[0].id, second.id);
    assert_eq!(mirror.books()[1].id, first.id);
  }

  #[test]
  fn update_replaces_matching_element() {
    let mut mirror = Mirror::new();
    let original = book("antes");
    mirror.apply(&ChangeEvent::Insert(original.clone()));

    let mut changed = original.clone();
    changed.title = "depois".into();
    mirror.apply(&ChangeEvent::Update(changed.clone()));

    assert_eq!(mirror.len(), 1);
    assert_eq!(mirror.books()[0].title, "depois");
  }

  #[test]
  fn update_is_idempotent() {
    let mut mirror = Mirror::new();
    let original = book("antes");
    mirror.apply(&ChangeEvent::Insert(original.clone()));

    let mut changed = original.clone();
    changed.rating = 5;
    let event = ChangeEvent::Update(changed);

    mirror.apply(&event);
    let once = mirror.books().to_vec();
    mirror.apply(&event);

    assert_eq!(mirror.books(), &once[..]);
  }

  #[test]
  fn update_without_match_is_dropped() {
    let mut mirror = Mirror::new();
    mirror.apply(&ChangeEvent::Insert(book("presente")));

    mirror.apply(&ChangeEvent::Update(book("fantasma")));
    assert_eq!(mirror.len(), 1);
    assert_eq!(mirror.books()[0].title, "presente");
  }

  #[test]
  fn delete_removes_and_tolerates_absence() {
    let mut mirror = Mirror::new();
    let kept = book("fica");
    let gone = book("sai");
    mirror.apply(&ChangeEvent::Insert(kept.clone()));
    mirror.apply(&ChangeEvent::Insert(gone.clone()));

    mirror.apply(&ChangeEvent::Delete(DeletedBook { id: gone.id }));
    assert_eq!(mirror.len(), 1);
    assert_eq!(mirror.books()[0].id, kept.id);

    // Deleting the same id again is a no-op.
    mirror.apply(&ChangeEvent::Delete(DeletedBook { id: gone.id }));
    assert_eq!(mirror.len(), 1);
  }

  #[test]
  fn full_fetch_replaces_reconciled_state() {
    let mut mirror = Mirror::new();
    mirror.apply(&ChangeEvent::Insert(book("pendente")));

    let fetched = vec![book("a"), book("b")];
    mirror.replace_all(fetched.clone());

    assert_eq!(mirror.books(), &fetched[..]);
  }

  #[test]
  fn stats_aggregate_status_and_pages() {
    let mut reading = book("lendo");
    reading.status = ReadingStatus::Reading;
    reading.pages_read = 100;

    let mut finished = book("lido");
    finished.status = ReadingStatus::Finished;
    finished.pages_read = 250;

    let mut mirror = Mirror::new();
    mirror.replace_all(vec![book("quero"), reading, finished]);

    let stats = mirror.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.want_to_read, 1);
    assert_eq!(stats.reading, 1);
    assert_eq!(stats.finished, 1);
    assert_eq!(stats.pages_read, 350);
  }
}
