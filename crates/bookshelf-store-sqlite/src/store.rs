//! [`SqliteStore`] — the SQLite implementation of [`BookStore`].

use std::path::Path;

use chrono::Datelike as _;
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use bookshelf_core::{
  book::{Book, BookPatch, NewBook},
  event::{ChangeEvent, DeletedBook},
  store::{BookFilter, BookStore, GenreRemoval},
};

use crate::{
  Error, Result,
  encode::{RawBook, encode_dt, encode_status, encode_uuid, now_micros},
  feed::ChangeFeed,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Bookshelf record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted and the
/// change feed is shared, so clones publish into the same feed.
///
/// Every mutation publishes its event from inside the serialized connection
/// closure, after the statement commits. Because that closure thread is the
/// only place events originate, broadcast delivery order always equals
/// commit order, even with concurrent callers.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  feed: ChangeFeed,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, feed: ChangeFeed::new() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, feed: ChangeFeed::new() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BookStore impl ──────────────────────────────────────────────────────────

impl BookStore for SqliteStore {
  type Error = Error;

  // ── Books ─────────────────────────────────────────────────────────────────

  async fn create_book(&self, input: NewBook) -> Result<Book> {
    input.validate()?;

    let now = now_micros();
    let book = Book {
      id:         Uuid::new_v4(),
      title:      input.title,
      author:     input.author,
      genre:      input.genre.unwrap_or_default(),
      year:       input.year.unwrap_or_else(|| now.year()),
      pages:      input.pages.unwrap_or(0),
      pages_read: input.pages_read.unwrap_or(0),
      status:     input.status.unwrap_or_default(),
      rating:     input.rating.unwrap_or(0),
      synopsis:   input.synopsis.unwrap_or_default(),
      cover:      input.cover.unwrap_or_default(),
      created_at: now,
      updated_at: now,
      owner:      input.owner,
    };

    let raw = RawBook::from_book(&book);
    let record = book.clone();
    let feed = self.feed.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO books (
             id, title, author, genre, year, pages, pages_read,
             status, rating, synopsis, cover, created_at, updated_at, owner
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
          rusqlite::params![
            raw.id,
            raw.title,
            raw.author,
            raw.genre,
            raw.year,
            raw.pages,
            raw.pages_read,
            raw.status,
            raw.rating,
            raw.synopsis,
            raw.cover,
            raw.created_at,
            raw.updated_at,
            raw.owner,
          ],
        )?;
        feed.publish(ChangeEvent::Insert(record));
        Ok(())
      })
      .await?;

    tracing::debug!(id = %book.id, title = %book.title, "book created");
    Ok(book)
  }

  async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM books WHERE id = ?1",
              RawBook::COLUMNS
            ),
            rusqlite::params![id_str],
            RawBook::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
    let mut conds: Vec<&'static str> = vec![];
    let mut args: Vec<String> = vec![];

    if let Some(genre) = &filter.genre {
      conds.push("genre = ?");
      args.push(genre.clone());
    }
    if let Some(search) = &filter.search {
      // instr is case-sensitive, unlike LIKE's ASCII folding.
      conds.push("(instr(title, ?) > 0 OR instr(author, ?) > 0)");
      args.push(search.clone());
      args.push(search.clone());
    }
    if let Some(status) = filter.status {
      conds.push("status = ?");
      args.push(encode_status(status).to_owned());
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let raws: Vec<RawBook> = self
      .conn
      .call(move |conn| {
        // rowid breaks created_at ties in insertion order.
        let sql = format!(
          "SELECT {} FROM books {where_clause}
           ORDER BY created_at DESC, rowid DESC",
          RawBook::COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), RawBook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }

  async fn update_book(&self, id: Uuid, patch: BookPatch) -> Result<Option<Book>> {
    patch.validate()?;

    let id_str = encode_uuid(id);
    let feed = self.feed.clone();

    // Read, merge, write, and publish inside one transaction on the
    // serialized connection. Two concurrent patches to the same id each see
    // the other's committed fields; neither merge is lost.
    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(found) = tx
          .query_row(
            &format!("SELECT {} FROM books WHERE id = ?1", RawBook::COLUMNS),
            rusqlite::params![id_str],
            RawBook::from_row,
          )
          .optional()?
        else {
          return Ok(None);
        };
        let mut book = found.into_book().map_err(Error::into_call)?;

        patch.apply_to(&mut book);
        book.updated_at = now_micros();

        let raw = RawBook::from_book(&book);
        tx.execute(
          "UPDATE books
           SET title = ?2, author = ?3, genre = ?4, year = ?5, pages = ?6,
               pages_read = ?7, status = ?8, rating = ?9, synopsis = ?10,
               cover = ?11, updated_at = ?12, owner = ?13
           WHERE id = ?1",
          rusqlite::params![
            raw.id,
            raw.title,
            raw.author,
            raw.genre,
            raw.year,
            raw.pages,
            raw.pages_read,
            raw.status,
            raw.rating,
            raw.synopsis,
            raw.cover,
            raw.updated_at,
            raw.owner,
          ],
        )?;
        tx.commit()?;

        feed.publish(ChangeEvent::Update(book.clone()));
        Ok(Some(book))
      })
      .await?;

    if let Some(book) = &updated {
      tracing::debug!(id = %book.id, "book updated");
    }
    Ok(updated)
  }

  async fn delete_book(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let feed = self.feed.clone();

    let removed = self
      .conn
      .call(move |conn| {
        let changed =
          conn.execute("DELETE FROM books WHERE id = ?1", rusqlite::params![id_str])?;
        let removed = changed > 0;
        if removed {
          feed.publish(ChangeEvent::Delete(DeletedBook { id }));
        }
        Ok(removed)
      })
      .await?;

    if removed {
      tracing::debug!(%id, "book deleted");
    }
    Ok(removed)
  }

  // ── Genres ────────────────────────────────────────────────────────────────

  async fn create_genre(&self, name: &str) -> Result<bool> {
    let name = name.trim().to_owned();
    if name.is_empty() {
      return Err(bookshelf_core::Error::EmptyGenreName.into());
    }

    let at_str = encode_dt(now_micros());
    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO genres (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![name, at_str],
        )?;
        Ok(changed > 0)
      })
      .await?;
    Ok(inserted)
  }

  async fn delete_genre(&self, name: &str) -> Result<GenreRemoval> {
    let name = name.to_owned();

    // Check-unreferenced and delete must be one transaction, or a book
    // created in between would be left pointing at a missing genre.
    let removal = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let referenced: bool = tx
          .query_row(
            "SELECT 1 FROM books WHERE genre = ?1 LIMIT 1",
            rusqlite::params![name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if referenced {
          return Ok(GenreRemoval::InUse);
        }

        let changed =
          tx.execute("DELETE FROM genres WHERE name = ?1", rusqlite::params![name])?;
        tx.commit()?;

        Ok(if changed > 0 {
          GenreRemoval::Removed
        } else {
          GenreRemoval::NotFound
        })
      })
      .await?;
    Ok(removal)
  }

  async fn list_genres(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM genres
           UNION
           SELECT DISTINCT genre FROM books WHERE genre <> ''
           ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  // ── Change feed ───────────────────────────────────────────────────────────

  fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
    self.feed.subscribe()
  }
}
