//! Book types — the central entity of the catalog.
//!
//! A [`Book`] is mutated in place by partial updates; the store refreshes
//! `updated_at` on every write. [`NewBook`] and [`BookPatch`] carry the
//! caller-supplied subsets for create and update respectively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Reading status ──────────────────────────────────────────────────────────

/// Where the owner is in their reading of a book.
///
/// Transitions are unconstrained: any value may follow any other.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingStatus {
  #[default]
  WantToRead,
  Reading,
  Finished,
}

impl ReadingStatus {
  /// Parse the wire representation (`"WANT_TO_READ"` etc.).
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "WANT_TO_READ" => Ok(Self::WantToRead),
      "READING" => Ok(Self::Reading),
      "FINISHED" => Ok(Self::Finished),
      other => Err(Error::UnknownStatus(other.to_string())),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::WantToRead => "WANT_TO_READ",
      Self::Reading => "READING",
      Self::Finished => "FINISHED",
    }
  }
}

// ─── Book ────────────────────────────────────────────────────────────────────

/// A fully-persisted catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  /// Unique, immutable after creation, never reused.
  pub id:         Uuid,
  pub title:      String,
  pub author:     String,
  /// May be empty; an empty genre is not surfaced by the genre registry.
  pub genre:      String,
  pub year:       i32,
  /// Total page count.
  pub pages:      u32,
  /// Not constrained to `<= pages`.
  pub pages_read: u32,
  pub status:     ReadingStatus,
  /// 0–5; 0 means unrated.
  pub rating:     u8,
  pub synopsis:   String,
  /// Cover image URL, or empty.
  pub cover:      String,
  pub created_at: DateTime<Utc>,
  /// Refreshed by the store on every mutation.
  pub updated_at: DateTime<Utc>,
  /// Reference to the owning identity, if any.
  pub owner:      Option<String>,
}

// ─── NewBook ─────────────────────────────────────────────────────────────────

/// Input for [`crate::store::BookStore::create_book`].
///
/// Omitted optional fields take their documented defaults; `year` defaults
/// to the current calendar year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBook {
  pub title:      String,
  pub author:     String,
  pub genre:      Option<String>,
  pub year:       Option<i32>,
  pub pages:      Option<u32>,
  pub pages_read: Option<u32>,
  pub status:     Option<ReadingStatus>,
  pub rating:     Option<u8>,
  pub synopsis:   Option<String>,
  pub cover:      Option<String>,
  pub owner:      Option<String>,
}

impl NewBook {
  pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      author: author.into(),
      ..Self::default()
    }
  }

  /// Required-field validation: title and author must be non-empty after
  /// trimming whitespace.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::EmptyTitle);
    }
    if self.author.trim().is_empty() {
      return Err(Error::EmptyAuthor);
    }
    Ok(())
  }
}

// ─── BookPatch ───────────────────────────────────────────────────────────────

/// Partial update for [`crate::store::BookStore::update_book`].
///
/// `None` fields retain their prior values (shallow merge). `owner` uses a
/// double `Option` so a patch can distinguish "leave alone" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
  pub title:      Option<String>,
  pub author:     Option<String>,
  pub genre:      Option<String>,
  pub year:       Option<i32>,
  pub pages:      Option<u32>,
  pub pages_read: Option<u32>,
  pub status:     Option<ReadingStatus>,
  pub rating:     Option<u8>,
  pub synopsis:   Option<String>,
  pub cover:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub owner:      Option<Option<String>>,
}

impl BookPatch {
  /// Rejects explicitly-supplied empty `title`/`author` updates. Absent
  /// fields are always fine.
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title
      && title.trim().is_empty()
    {
      return Err(Error::EmptyTitle);
    }
    if let Some(author) = &self.author
      && author.trim().is_empty()
    {
      return Err(Error::EmptyAuthor);
    }
    Ok(())
  }

  /// Merge this patch onto `book`, field by field. Does not touch
  /// timestamps; the store owns those.
  pub fn apply_to(&self, book: &mut Book) {
    if let Some(v) = &self.title {
      book.title = v.clone();
    }
    if let Some(v) = &self.author {
      book.author = v.clone();
    }
    if let Some(v) = &self.genre {
      book.genre = v.clone();
    }
    if let Some(v) = self.year {
      book.year = v;
    }
    if let Some(v) = self.pages {
      book.pages = v;
    }
    if let Some(v) = self.pages_read {
      book.pages_read = v;
    }
    if let Some(v) = self.status {
      book.status = v;
    }
    if let Some(v) = self.rating {
      book.rating = v;
    }
    if let Some(v) = &self.synopsis {
      book.synopsis = v.clone();
    }
    if let Some(v) = &self.cover {
      book.cover = v.clone();
    }
    if let Some(v) = &self.owner {
      book.owner = v.clone();
    }
  }
}
