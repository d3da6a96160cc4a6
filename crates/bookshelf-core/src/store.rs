//! The `BookStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `bookshelf-store-sqlite`). Higher layers (`bookshelf-api`,
//! `bookshelf-client` tests) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  book::{Book, BookPatch, NewBook, ReadingStatus},
  event::ChangeEvent,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Optional predicates for [`BookStore::list_books`]; omitted predicates
/// impose no restriction, present ones compose with logical AND.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
  /// Exact, case-sensitive match on `Book::genre`.
  pub genre:  Option<String>,
  /// Case-sensitive substring match over title OR author.
  pub search: Option<String>,
  /// Exact status match, applied after genre/search narrowing.
  pub status: Option<ReadingStatus>,
}

impl BookFilter {
  pub fn genre(name: impl Into<String>) -> Self {
    Self {
      genre: Some(name.into()),
      ..Self::default()
    }
  }
}

// ─── Genre removal outcome ───────────────────────────────────────────────────

/// Result of [`BookStore::delete_genre`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreRemoval {
  Removed,
  /// At least one book still references the genre; nothing was deleted.
  InUse,
  NotFound,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the authoritative book/genre persistence layer.
///
/// All mutating operations are atomic with respect to a single record, and
/// every committed book mutation is published on the change feed exposed by
/// [`BookStore::subscribe`].
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Books ─────────────────────────────────────────────────────────────

  /// Validate, fill defaults, assign a fresh unique id and timestamps,
  /// persist, and return the full record.
  fn create_book(
    &self,
    input: NewBook,
  ) -> impl Future<Output = Result<Book, Self::Error>> + Send + '_;

  /// Retrieve a book by id. Returns `None` if not found — a missing id is
  /// not an error at this layer.
  fn get_book(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  /// List books matching `filter`, ordered by `created_at` descending.
  fn list_books<'a>(
    &'a self,
    filter: &'a BookFilter,
  ) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + 'a;

  /// Shallow-merge `patch` onto the existing record, refresh `updated_at`,
  /// persist, and return the merged record. Returns `None` if no record
  /// exists for `id`.
  fn update_book(
    &self,
    id: Uuid,
    patch: BookPatch,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  /// Remove the record. Returns whether a record existed.
  fn delete_book(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Genres ────────────────────────────────────────────────────────────

  /// Idempotent insert into the genre registry. Returns whether a new row
  /// was actually inserted (`false` if the name was already present).
  fn create_genre<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove a registry entry, refusing while any book references the name.
  /// The in-use check and the delete are atomic.
  fn delete_genre<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<GenreRemoval, Self::Error>> + Send + 'a;

  /// Sorted ascending union of explicit registry names and distinct
  /// non-empty genre values currently present across books.
  fn list_genres(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Change feed ───────────────────────────────────────────────────────

  /// Subscribe to the whole-table change feed. Delivery per receiver
  /// matches commit order; a receiver that lags past the channel capacity
  /// is disconnected and must re-fetch full state (no replay).
  fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
