//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` offset) so lexicographic column order equals chronological
//! order. UUIDs are stored as hyphenated lowercase strings; the reading
//! status as its wire discriminant.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use bookshelf_core::book::{Book, ReadingStatus};
use uuid::Uuid;

use crate::{Error, Result};

/// Current time truncated to the stored (microsecond) precision, so a
/// freshly created record compares equal to its later decoded form.
pub fn now_micros() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ReadingStatus ───────────────────────────────────────────────────────────

pub fn encode_status(status: ReadingStatus) -> &'static str { status.as_str() }

pub fn decode_status(s: &str) -> Result<ReadingStatus> {
  Ok(ReadingStatus::parse(s)?)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `books` row.
pub struct RawBook {
  pub id:         String,
  pub title:      String,
  pub author:     String,
  pub genre:      String,
  pub year:       i32,
  pub pages:      u32,
  pub pages_read: u32,
  pub status:     String,
  pub rating:     u8,
  pub synopsis:   String,
  pub cover:      String,
  pub created_at: String,
  pub updated_at: String,
  pub owner:      Option<String>,
}

impl RawBook {
  /// Column list matching [`RawBook::from_row`]'s ordinals.
  pub const COLUMNS: &'static str = "id, title, author, genre, year, pages, \
     pages_read, status, rating, synopsis, cover, created_at, updated_at, \
     owner";

  pub fn from_book(book: &Book) -> Self {
    Self {
      id:         encode_uuid(book.id),
      title:      book.title.clone(),
      author:     book.author.clone(),
      genre:      book.genre.clone(),
      year:       book.year,
      pages:      book.pages,
      pages_read: book.pages_read,
      status:     encode_status(book.status).to_owned(),
      rating:     book.rating,
      synopsis:   book.synopsis.clone(),
      cover:      book.cover.clone(),
      created_at: encode_dt(book.created_at),
      updated_at: encode_dt(book.updated_at),
      owner:      book.owner.clone(),
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      title:      row.get(1)?,
      author:     row.get(2)?,
      genre:      row.get(3)?,
      year:       row.get(4)?,
      pages:      row.get(5)?,
      pages_read: row.get(6)?,
      status:     row.get(7)?,
      rating:     row.get(8)?,
      synopsis:   row.get(9)?,
      cover:      row.get(10)?,
      created_at: row.get(11)?,
      updated_at: row.get(12)?,
      owner:      row.get(13)?,
    })
  }

  pub fn into_book(self) -> Result<Book> {
    Ok(Book {
      id:         decode_uuid(&self.id)?,
      title:      self.title,
      author:     self.author,
      genre:      self.genre,
      year:       self.year,
      pages:      self.pages,
      pages_read: self.pages_read,
      status:     decode_status(&self.status)?,
      rating:     self.rating,
      synopsis:   self.synopsis,
      cover:      self.cover,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      owner:      self.owner,
    })
  }
}
