//! Error types for `bookshelf-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("title must not be empty")]
  EmptyTitle,

  #[error("author must not be empty")]
  EmptyAuthor,

  #[error("genre name must not be empty")]
  EmptyGenreName,

  #[error("unknown reading status: {0:?}")]
  UnknownStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
