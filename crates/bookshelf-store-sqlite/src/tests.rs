//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use bookshelf_core::{
  book::{BookPatch, NewBook, ReadingStatus},
  event::ChangeEvent,
  store::{BookFilter, BookStore, GenreRemoval},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn duna() -> NewBook {
  NewBook {
    pages: Some(688),
    genre: Some("Ficção Científica".into()),
    year: Some(1965),
    ..NewBook::new("Duna", "Frank Herbert")
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_fills_defaults() {
  let s = store().await;
  let book = s.create_book(duna()).await.unwrap();

  assert_eq!(book.status, ReadingStatus::WantToRead);
  assert_eq!(book.rating, 0);
  assert_eq!(book.pages_read, 0);
  assert_eq!(book.pages, 688);
  assert_eq!(book.synopsis, "");
  assert_eq!(book.cover, "");
  assert_eq!(book.owner, None);
  assert_eq!(book.created_at, book.updated_at);
}

#[tokio::test]
async fn create_defaults_year_to_current() {
  use chrono::Datelike as _;

  let s = store().await;
  let book = s
    .create_book(NewBook::new("Sem Ano", "Autora"))
    .await
    .unwrap();
  assert_eq!(book.year, chrono::Utc::now().year());
}

#[tokio::test]
async fn create_issues_unique_ids() {
  let s = store().await;
  let mut seen = HashSet::new();
  for _ in 0..20 {
    let book = s.create_book(duna()).await.unwrap();
    assert!(seen.insert(book.id), "id {} reissued", book.id);
  }
}

#[tokio::test]
async fn create_rejects_blank_title_and_author() {
  let s = store().await;

  let err = s
    .create_book(NewBook::new("   ", "Frank Herbert"))
    .await
    .unwrap_err();
  assert!(err.is_validation());

  let err = s.create_book(NewBook::new("Duna", "")).await.unwrap_err();
  assert!(err.is_validation());
}

// ─── Get ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_round_trips_created_record() {
  let s = store().await;
  let created = s.create_book(duna()).await.unwrap();

  let fetched = s.get_book(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get_book(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_only_supplied_fields() {
  let s = store().await;
  let created = s.create_book(duna()).await.unwrap();

  let patch = BookPatch {
    rating: Some(5),
    ..Default::default()
  };
  let updated = s.update_book(created.id, patch).await.unwrap().unwrap();

  assert_eq!(updated.rating, 5);
  assert!(updated.updated_at > created.updated_at);

  // Every other field is identical to the pre-update record.
  let mut expected = created.clone();
  expected.rating = 5;
  expected.updated_at = updated.updated_at;
  assert_eq!(updated, expected);

  let fetched = s.get_book(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let patch = BookPatch {
    rating: Some(3),
    ..Default::default()
  };
  assert!(s.update_book(Uuid::new_v4(), patch).await.unwrap().is_none());
}

#[tokio::test]
async fn update_rejects_explicit_blank_title() {
  let s = store().await;
  let created = s.create_book(duna()).await.unwrap();

  let patch = BookPatch {
    title: Some("  ".into()),
    ..Default::default()
  };
  let err = s.update_book(created.id, patch).await.unwrap_err();
  assert!(err.is_validation());

  // The record is untouched.
  let fetched = s.get_book(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_progress_keeps_page_count() {
  let s = store().await;
  let created = s.create_book(duna()).await.unwrap();

  let patch = BookPatch {
    pages_read: Some(100),
    status: Some(ReadingStatus::Reading),
    ..Default::default()
  };
  let updated = s.update_book(created.id, patch).await.unwrap().unwrap();

  assert_eq!(updated.pages, 688);
  assert_eq!(updated.pages_read, 100);
  assert_eq!(updated.status, ReadingStatus::Reading);
}

#[tokio::test]
async fn update_can_clear_owner() {
  let s = store().await;
  let created = s
    .create_book(NewBook {
      owner: Some("user-1".into()),
      ..duna()
    })
    .await
    .unwrap();
  assert_eq!(created.owner.as_deref(), Some("user-1"));

  let patch = BookPatch {
    owner: Some(None),
    ..Default::default()
  };
  let updated = s.update_book(created.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.owner, None);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_get_is_not_found() {
  let s = store().await;
  let created = s.create_book(duna()).await.unwrap();

  assert!(s.delete_book(created.id).await.unwrap());
  assert!(s.get_book(created.id).await.unwrap().is_none());

  // Second delete reports no record.
  assert!(!s.delete_book(created.id).await.unwrap());
}

// ─── List & filter ───────────────────────────────────────────────────────────

async fn seed_catalog(s: &SqliteStore) {
  for (title, author, genre, status) in [
    ("O Senhor dos Anéis", "J.R.R. Tolkien", "Fantasia", ReadingStatus::Reading),
    ("A Guerra dos Tronos", "George R.R. Martin", "Fantasia", ReadingStatus::WantToRead),
    ("1984", "George Orwell", "Distopia", ReadingStatus::Finished),
    ("Duna", "Frank Herbert", "Ficção Científica", ReadingStatus::Reading),
  ] {
    s.create_book(NewBook {
      genre: Some(genre.into()),
      status: Some(status),
      ..NewBook::new(title, author)
    })
    .await
    .unwrap();
  }
}

#[tokio::test]
async fn list_orders_most_recent_first() {
  let s = store().await;
  seed_catalog(&s).await;

  let titles: Vec<_> = s
    .list_books(&BookFilter::default())
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.title)
    .collect();
  assert_eq!(
    titles,
    ["Duna", "1984", "A Guerra dos Tronos", "O Senhor dos Anéis"]
  );
}

#[tokio::test]
async fn list_filters_by_genre_exactly() {
  let s = store().await;
  seed_catalog(&s).await;

  let books = s.list_books(&BookFilter::genre("Fantasia")).await.unwrap();
  assert_eq!(books.len(), 2);
  assert!(books.iter().all(|b| b.genre == "Fantasia"));
  // Still most-recent-first.
  assert_eq!(books[0].title, "A Guerra dos Tronos");

  // Case matters.
  let books = s.list_books(&BookFilter::genre("fantasia")).await.unwrap();
  assert!(books.is_empty());
}

#[tokio::test]
async fn search_matches_title_or_author_substring() {
  let s = store().await;
  seed_catalog(&s).await;

  let filter = BookFilter {
    search: Some("Orwell".into()),
    ..Default::default()
  };
  let books = s.list_books(&filter).await.unwrap();
  assert_eq!(books.len(), 1);
  assert_eq!(books[0].title, "1984");

  let filter = BookFilter {
    search: Some("Guerra".into()),
    ..Default::default()
  };
  assert_eq!(s.list_books(&filter).await.unwrap().len(), 1);

  // Substring match is case-sensitive.
  let filter = BookFilter {
    search: Some("orwell".into()),
    ..Default::default()
  };
  assert!(s.list_books(&filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn filters_compose_with_and() {
  let s = store().await;
  seed_catalog(&s).await;

  let filter = BookFilter {
    genre: Some("Fantasia".into()),
    status: Some(ReadingStatus::Reading),
    ..Default::default()
  };
  let books = s.list_books(&filter).await.unwrap();
  assert_eq!(books.len(), 1);
  assert_eq!(books[0].title, "O Senhor dos Anéis");
}

#[tokio::test]
async fn status_filter_alone() {
  let s = store().await;
  seed_catalog(&s).await;

  let filter = BookFilter {
    status: Some(ReadingStatus::Reading),
    ..Default::default()
  };
  let books = s.list_books(&filter).await.unwrap();
  assert_eq!(books.len(), 2);
  assert!(books.iter().all(|b| b.status == ReadingStatus::Reading));
}

// ─── Genres ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_genre_is_idempotent() {
  let s = store().await;

  assert!(s.create_genre("Ficção").await.unwrap());
  // Duplicate creation reports "already exists", registry stays unique.
  assert!(!s.create_genre("Ficção").await.unwrap());

  let genres = s.list_genres().await.unwrap();
  assert_eq!(genres, ["Ficção"]);
}

#[tokio::test]
async fn create_genre_trims_and_rejects_blank() {
  let s = store().await;
  assert!(s.create_genre("  Fábula  ").await.unwrap());
  assert_eq!(s.list_genres().await.unwrap(), ["Fábula"]);

  assert!(s.create_genre("   ").await.unwrap_err().is_validation());
}

#[tokio::test]
async fn list_genres_unions_registry_and_books() {
  let s = store().await;
  s.create_genre("Fábula").await.unwrap();
  s.create_genre("Fantasia").await.unwrap();
  s.create_book(NewBook {
    genre: Some("Distopia".into()),
    ..NewBook::new("1984", "George Orwell")
  })
  .await
  .unwrap();
  // Registered and implicitly used: appears once.
  s.create_book(NewBook {
    genre: Some("Fantasia".into()),
    ..NewBook::new("O Hobbit", "J.R.R. Tolkien")
  })
  .await
  .unwrap();
  // Empty genre is not surfaced.
  s.create_book(NewBook::new("Sem Gênero", "Anônimo"))
    .await
    .unwrap();

  let genres = s.list_genres().await.unwrap();
  assert_eq!(genres, ["Distopia", "Fantasia", "Fábula"]);
}

#[tokio::test]
async fn delete_genre_blocked_while_referenced() {
  let s = store().await;
  s.create_genre("Fantasia").await.unwrap();
  let book = s
    .create_book(NewBook {
      genre: Some("Fantasia".into()),
      ..NewBook::new("O Hobbit", "J.R.R. Tolkien")
    })
    .await
    .unwrap();

  assert_eq!(
    s.delete_genre("Fantasia").await.unwrap(),
    GenreRemoval::InUse
  );

  // Re-genre the last referencing book; deletion then succeeds.
  s.update_book(book.id, BookPatch {
    genre: Some("Aventura".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert_eq!(
    s.delete_genre("Fantasia").await.unwrap(),
    GenreRemoval::Removed
  );
}

#[tokio::test]
async fn delete_genre_unknown_reports_not_found() {
  let s = store().await;
  assert_eq!(
    s.delete_genre("Inexistente").await.unwrap(),
    GenreRemoval::NotFound
  );
}

#[tokio::test]
async fn delete_genre_blocked_by_implicit_reference() {
  // The guard applies even when the genre was never registered explicitly.
  let s = store().await;
  s.create_genre("Fábula").await.unwrap();
  s.create_book(NewBook {
    genre: Some("Fábula".into()),
    ..NewBook::new("O Pequeno Príncipe", "Antoine de Saint-Exupéry")
  })
  .await
  .unwrap();

  assert_eq!(s.delete_genre("Fábula").await.unwrap(), GenreRemoval::InUse);
}

// ─── Change feed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn mutations_publish_events_in_commit_order() {
  let s = store().await;
  let mut rx = s.subscribe();

  let created = s.create_book(duna()).await.unwrap();
  let updated = s
    .update_book(created.id, BookPatch {
      rating: Some(5),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  s.delete_book(created.id).await.unwrap();

  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Insert(created.clone()));
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Update(updated));
  let deleted = rx.recv().await.unwrap();
  assert!(matches!(deleted, ChangeEvent::Delete(d) if d.id == created.id));
}

#[tokio::test]
async fn failed_and_noop_mutations_publish_nothing() {
  let s = store().await;
  let mut rx = s.subscribe();

  // Validation failure, missing-id update, missing-id delete: no events.
  s.create_book(NewBook::new("", "Autora")).await.unwrap_err();
  s.update_book(Uuid::new_v4(), BookPatch {
    rating: Some(1),
    ..Default::default()
  })
  .await
  .unwrap();
  s.delete_book(Uuid::new_v4()).await.unwrap();

  let created = s.create_book(duna()).await.unwrap();
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Insert(created));
  assert!(matches!(
    rx.try_recv(),
    Err(tokio::sync::broadcast::error::TryRecvError::Empty)
  ));
}

#[tokio::test]
async fn concurrent_creates_deliver_in_commit_order() {
  // Events are published from the serialized connection closure, so even
  // racing writers cannot reorder delivery relative to commit order.
  for round in 0..4 {
    let s = store().await;
    let mut rx = s.subscribe();

    let writers: Vec<_> = (0..8)
      .map(|i| {
        let s = s.clone();
        tokio::spawn(async move {
          s.create_book(NewBook::new(format!("Livro {i}"), "Autora"))
            .await
            .unwrap()
        })
      })
      .collect();
    for writer in writers {
      writer.await.unwrap();
    }

    // Listing is most-recent-first; reversed, it is commit order.
    let mut committed: Vec<Uuid> = s
      .list_books(&BookFilter::default())
      .await
      .unwrap()
      .into_iter()
      .map(|b| b.id)
      .collect();
    committed.reverse();

    let mut delivered = Vec::with_capacity(8);
    for _ in 0..8 {
      delivered.push(rx.recv().await.unwrap().book_id());
    }
    assert_eq!(delivered, committed, "round {round}");
  }
}

#[tokio::test]
async fn concurrent_patches_to_same_book_both_land() {
  // Read-merge-write runs in one transaction per patch; whichever patch
  // commits second merges onto the first one's result instead of the
  // original row, so neither field is lost.
  for round in 0..4 {
    let s = store().await;
    let created = s.create_book(duna()).await.unwrap();

    let rating = BookPatch {
      rating: Some(5),
      ..Default::default()
    };
    let progress = BookPatch {
      pages_read: Some(100),
      ..Default::default()
    };
    let (a, b) = tokio::join!(
      s.update_book(created.id, rating),
      s.update_book(created.id, progress),
    );
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    let fetched = s.get_book(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.rating, 5, "round {round}");
    assert_eq!(fetched.pages_read, 100, "round {round}");
  }
}

#[tokio::test]
async fn each_subscriber_sees_commit_order_independently() {
  let s = store().await;
  let mut early = s.subscribe();

  let first = s.create_book(duna()).await.unwrap();

  // A subscriber attached later misses earlier commits — no replay.
  let mut late = s.subscribe();
  let second = s
    .create_book(NewBook::new("1984", "George Orwell"))
    .await
    .unwrap();

  assert_eq!(early.recv().await.unwrap().book_id(), first.id);
  assert_eq!(early.recv().await.unwrap().book_id(), second.id);
  assert_eq!(late.recv().await.unwrap().book_id(), second.id);
}

// ─── Mirror end-to-end ───────────────────────────────────────────────────────

#[tokio::test]
async fn mirror_tracks_store_through_events() {
  use bookshelf_core::mirror::Mirror;

  let s = store().await;
  let mut rx = s.subscribe();
  let mut mirror = Mirror::new();

  let a = s.create_book(duna()).await.unwrap();
  let b = s
    .create_book(NewBook::new("1984", "George Orwell"))
    .await
    .unwrap();
  s.update_book(a.id, BookPatch {
    status: Some(ReadingStatus::Finished),
    ..Default::default()
  })
  .await
  .unwrap();
  s.delete_book(b.id).await.unwrap();

  for _ in 0..4 {
    let event = rx.recv().await.unwrap();
    mirror.apply(&event);
  }

  let listed = s.list_books(&BookFilter::default()).await.unwrap();
  assert_eq!(mirror.books(), &listed[..]);
  assert_eq!(mirror.stats().finished, 1);
}
