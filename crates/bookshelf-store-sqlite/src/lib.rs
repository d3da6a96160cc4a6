//! SQLite backend for the Bookshelf record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime; the single connection also
//! serializes concurrent store calls, which is what makes each mutation
//! atomic with respect to readers.

mod encode;
mod feed;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use feed::ChangeFeed;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
