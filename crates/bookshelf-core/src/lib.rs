//! Core types and trait definitions for the Bookshelf catalog.
//!
//! This crate is deliberately free of HTTP and database dependencies; the
//! only runtime type it exposes is the [`tokio::sync::broadcast`] receiver
//! handed out by [`store::BookStore::subscribe`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod book;
pub mod error;
pub mod event;
pub mod mirror;
pub mod store;

pub use error::{Error, Result};
