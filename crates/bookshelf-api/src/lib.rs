//! JSON REST + SSE API for the Bookshelf catalog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`bookshelf_core::store::BookStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility (identity is delegated to an external
//! provider).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bookshelf_api::router(store.clone()))
//! ```

pub mod books;
pub mod changes;
pub mod error;
pub mod genres;
pub mod response;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get},
};
use serde::Deserialize;

use bookshelf_core::store::BookStore;

pub use error::ApiError;
pub use response::ApiResponse;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BOOKSHELF_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: BookStore + 'static,
{
  Router::new()
    // Books
    .route("/books", get(books::list::<S>).post(books::create::<S>))
    .route(
      "/books/{id}",
      get(books::get_one::<S>)
        .put(books::update::<S>)
        .delete(books::delete::<S>),
    )
    // Genres
    .route("/genres", get(genres::list::<S>).post(genres::create::<S>))
    .route("/genres/{name}", delete(genres::delete::<S>))
    // Change feed
    .route("/changes", get(changes::subscribe::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
