//! Handlers for `/books` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/books` | optional `genre`, `status`, `search`; `all` sentinels ignored |
//! | `GET`    | `/books/:id` | single book |
//! | `POST`   | `/books` | body: [`NewBook`]; returns 201 + created book |
//! | `PUT`    | `/books/:id` | body: [`BookPatch`]; returns merged book |
//! | `DELETE` | `/books/:id` | returns a confirmation envelope |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use bookshelf_core::{
  book::{Book, BookPatch, NewBook, ReadingStatus},
  store::{BookFilter, BookStore},
};

use crate::{error::ApiError, response::ApiResponse};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Exact genre; `"all"` (or absent) imposes no restriction.
  pub genre:  Option<String>,
  /// Wire status (`WANT_TO_READ` etc.); `"all"` imposes no restriction.
  pub status: Option<String>,
  /// Substring over title or author.
  pub search: Option<String>,
}

impl ListParams {
  fn into_filter(self) -> Result<BookFilter, ApiError> {
    let status = match self.status.as_deref() {
      None | Some("all") => None,
      Some(s) => Some(
        ReadingStatus::parse(s).map_err(|e| ApiError::BadRequest(e.to_string()))?,
      ),
    };
    Ok(BookFilter {
      genre: self.genre.filter(|g| g != "all"),
      search: self.search.filter(|s| !s.is_empty()),
      status,
    })
  }
}

/// `GET /books[?genre=...][&status=...][&search=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<Book>>>, ApiError>
where
  S: BookStore,
{
  let filter = params.into_filter()?;
  let books = store
    .list_books(&filter)
    .await
    .map_err(ApiError::store)?;

  let total = books.len();
  Ok(Json(ApiResponse::data(books).with_total(total)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /books/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Book>>, ApiError>
where
  S: BookStore,
{
  let book = store
    .get_book(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("book {id} not found")))?;
  Ok(Json(ApiResponse::data(book)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /books` — returns 201 + the created [`Book`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewBook>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookStore,
{
  body
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let book = store
    .create_book(body)
    .await
    .map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(ApiResponse::data(book).with_message("book created")),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /books/:id` — body is a [`BookPatch`]; unsupplied fields are left
/// unchanged.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<BookPatch>,
) -> Result<Json<ApiResponse<Book>>, ApiError>
where
  S: BookStore,
{
  body
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let book = store
    .update_book(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("book {id} not found")))?;
  Ok(Json(ApiResponse::data(book).with_message("book updated")))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /books/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError>
where
  S: BookStore,
{
  let removed = store
    .delete_book(id)
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(format!("book {id} not found")));
  }
  Ok(Json(
    ApiResponse::data(serde_json::json!({ "id": id })).with_message("book removed"),
  ))
}
