//! Async HTTP client wrapping the Bookshelf JSON API.

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use bookshelf_core::{
  book::{Book, BookPatch, NewBook},
  store::BookFilter,
};

use crate::changes::ChangeStream;

/// Connection settings for the Bookshelf API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Wire shape of every API response.
#[derive(Debug, serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct Envelope<T> {
  success: bool,
  #[serde(default)]
  data:    Option<T>,
  #[serde(default)]
  error:   Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct GenreListData {
  genres: Vec<String>,
}

/// Async HTTP client for the Bookshelf JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Unwrap a success envelope, or surface the server's error message.
  async fn unwrap_data<T: DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
  ) -> Result<T> {
    let status = resp.status();
    let envelope: Envelope<T> = resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))?;

    if !envelope.success {
      let message = envelope.error.unwrap_or_else(|| status.to_string());
      return Err(anyhow!("{what} failed: {message}"));
    }
    envelope
      .data
      .ok_or_else(|| anyhow!("{what} response carried no data"))
  }

  // ── Books ─────────────────────────────────────────────────────────────────

  /// `GET /books[?genre&status&search]`
  pub async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
    let mut query: Vec<(&str, String)> = vec![];
    if let Some(genre) = &filter.genre {
      query.push(("genre", genre.clone()));
    }
    if let Some(status) = filter.status {
      query.push(("status", status.as_str().to_owned()));
    }
    if let Some(search) = &filter.search {
      query.push(("search", search.clone()));
    }

    let resp = self
      .client
      .get(self.url("/books"))
      .query(&query)
      .send()
      .await
      .context("GET /books failed")?;
    Self::unwrap_data(resp, "list books").await
  }

  /// `GET /books/:id` — `None` for a 404.
  pub async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    let resp = self
      .client
      .get(self.url(&format!("/books/{id}")))
      .send()
      .await
      .context("GET /books/:id failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Ok(Some(Self::unwrap_data(resp, "get book").await?))
  }

  /// `POST /books`
  pub async fn create_book(&self, book: &NewBook) -> Result<Book> {
    let resp = self
      .client
      .post(self.url("/books"))
      .json(book)
      .send()
      .await
      .context("POST /books failed")?;
    Self::unwrap_data(resp, "create book").await
  }

  /// `PUT /books/:id`
  pub async fn update_book(&self, id: Uuid, patch: &BookPatch) -> Result<Book> {
    let resp = self
      .client
      .put(self.url(&format!("/books/{id}")))
      .json(patch)
      .send()
      .await
      .context("PUT /books/:id failed")?;
    Self::unwrap_data(resp, "update book").await
  }

  /// `DELETE /books/:id` — `false` for a 404.
  pub async fn delete_book(&self, id: Uuid) -> Result<bool> {
    let resp = self
      .client
      .delete(self.url(&format!("/books/{id}")))
      .send()
      .await
      .context("DELETE /books/:id failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    Self::unwrap_data::<serde_json::Value>(resp, "delete book").await?;
    Ok(true)
  }

  // ── Genres ────────────────────────────────────────────────────────────────

  /// `GET /genres`
  pub async fn list_genres(&self) -> Result<Vec<String>> {
    let resp = self
      .client
      .get(self.url("/genres"))
      .send()
      .await
      .context("GET /genres failed")?;
    let data: GenreListData = Self::unwrap_data(resp, "list genres").await?;
    Ok(data.genres)
  }

  /// `POST /genres` — `false` when the name already existed.
  pub async fn create_genre(&self, name: &str) -> Result<bool> {
    let resp = self
      .client
      .post(self.url("/genres"))
      .json(&serde_json::json!({ "name": name }))
      .send()
      .await
      .context("POST /genres failed")?;

    if resp.status() == StatusCode::CONFLICT {
      return Ok(false);
    }
    Self::unwrap_data::<serde_json::Value>(resp, "create genre").await?;
    Ok(true)
  }

  /// `DELETE /genres/:name`
  pub async fn delete_genre(&self, name: &str) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/genres/{name}")))
      .send()
      .await
      .context("DELETE /genres/:name failed")?;
    Self::unwrap_data::<serde_json::Value>(resp, "delete genre").await?;
    Ok(())
  }

  // ── Change feed ───────────────────────────────────────────────────────────

  /// `GET /changes` — open the server-sent-event stream.
  ///
  /// The client-wide 30 s timeout would sever a long-lived stream, so it is
  /// overridden here; when the stream does end, the caller resubscribes and
  /// re-fetches full state.
  pub async fn subscribe_changes(&self) -> Result<ChangeStream> {
    let resp = self
      .client
      .get(self.url("/changes"))
      .timeout(Duration::from_secs(60 * 60 * 24))
      .send()
      .await
      .context("GET /changes failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /changes → {}", resp.status()));
    }
    Ok(ChangeStream::new(resp))
  }
}
