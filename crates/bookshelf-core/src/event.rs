//! Change notification events.
//!
//! Every committed book mutation produces exactly one [`ChangeEvent`] on the
//! store's broadcast feed. INSERT and UPDATE carry the post-mutation record;
//! DELETE carries only the identity of the removed row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::book::Book;

/// Identity of a deleted book — all a DELETE event can still report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedBook {
  pub id: Uuid,
}

/// One committed mutation against the books table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "UPPERCASE")]
pub enum ChangeEvent {
  Insert(Book),
  Update(Book),
  Delete(DeletedBook),
}

impl ChangeEvent {
  /// The id of the book this event concerns.
  pub fn book_id(&self) -> Uuid {
    match self {
      Self::Insert(book) | Self::Update(book) => book.id,
      Self::Delete(deleted) => deleted.id,
    }
  }
}
