//! SQL schema for the Bookshelf SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS books (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    author      TEXT NOT NULL,
    genre       TEXT NOT NULL DEFAULT '',
    year        INTEGER NOT NULL,
    pages       INTEGER NOT NULL DEFAULT 0,
    pages_read  INTEGER NOT NULL DEFAULT 0,
    status      TEXT NOT NULL DEFAULT 'WANT_TO_READ',
    rating      INTEGER NOT NULL DEFAULT 0,
    synopsis    TEXT NOT NULL DEFAULT '',
    cover       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,   -- fixed-width RFC 3339 UTC; server-assigned
    updated_at  TEXT NOT NULL,   -- refreshed on every mutation
    owner       TEXT             -- external identity reference, or NULL
);

-- Explicit genre registry. Genres also exist implicitly as distinct
-- Book.genre values; listing unions both sources.
CREATE TABLE IF NOT EXISTS genres (
    name        TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS books_genre_idx   ON books(genre);
CREATE INDEX IF NOT EXISTS books_created_idx ON books(created_at);

PRAGMA user_version = 1;
";
