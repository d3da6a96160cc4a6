//! Error type for `bookshelf-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Validation failure surfaced from the core types (empty title/author,
  /// empty genre name).
  #[error("validation error: {0}")]
  Validation(#[from] bookshelf_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Whether this failure is user-correctable (400-class) rather than a
  /// storage-engine fault.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation(_))
  }

  /// Wrap for propagation out of a [`tokio_rusqlite`] call closure.
  pub(crate) fn into_call(self) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(self))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
