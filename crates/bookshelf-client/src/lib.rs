//! HTTP client for the Bookshelf API, plus the session type that keeps a
//! client-side [`Mirror`](bookshelf_core::mirror::Mirror) reconciled from
//! the server's change stream.

pub mod changes;
pub mod client;
pub mod session;

pub use changes::{ChangeStream, SseDecoder};
pub use client::{ApiClient, ApiConfig};
pub use session::CatalogSession;
