//! Handlers for `/genres` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/genres` | sorted union of registry + in-use genre names |
//! | `POST`   | `/genres` | body: `{"name": "..."}`; 409 on duplicate |
//! | `DELETE` | `/genres/:name` | 400 while any book references the name |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use bookshelf_core::store::{BookStore, GenreRemoval};

use crate::{error::ApiError, response::ApiResponse};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenreList {
  pub genres: Vec<String>,
  pub total:  usize,
}

/// `GET /genres`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<ApiResponse<GenreList>>, ApiError>
where
  S: BookStore,
{
  let genres = store.list_genres().await.map_err(ApiError::store)?;
  let total = genres.len();
  Ok(Json(ApiResponse::data(GenreList { genres, total })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateGenreBody {
  pub name: String,
}

/// `POST /genres` — idempotent at the store, but a duplicate is reported to
/// the caller as 409 so "already exists" is distinguishable from "created".
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateGenreBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookStore,
{
  let name = body.name.trim().to_owned();
  if name.is_empty() {
    return Err(ApiError::BadRequest("genre name must not be empty".into()));
  }

  let inserted = store
    .create_genre(&name)
    .await
    .map_err(ApiError::store)?;
  if !inserted {
    return Err(ApiError::Conflict(format!("genre {name:?} already exists")));
  }

  Ok((
    StatusCode::CREATED,
    Json(
      ApiResponse::data(serde_json::json!({ "name": name }))
        .with_message("genre created"),
    ),
  ))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /genres/:name` (the path segment is percent-decoded by axum).
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(name): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError>
where
  S: BookStore,
{
  match store.delete_genre(&name).await.map_err(ApiError::store)? {
    GenreRemoval::Removed => Ok(Json(
      ApiResponse::data(serde_json::json!({ "name": name }))
        .with_message("genre removed"),
    )),
    GenreRemoval::InUse => Err(ApiError::BadRequest(format!(
      "genre {name:?} is referenced by existing books"
    ))),
    GenreRemoval::NotFound => {
      Err(ApiError::NotFound(format!("genre {name:?} not found")))
    }
  }
}
