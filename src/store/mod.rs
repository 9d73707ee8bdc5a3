//! SQLite-backed Persistence Layer
//! Mission: One store handle, explicit queries, explicit transactions
//!
//! Every multi-statement operation (cascade deletes, ownership-checked
//! mutations) runs inside a single transaction so partial writes can't
//! leak and check-then-mutate races can't occur between statements.

mod comments;
mod follows;
mod tweets;
mod users;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::User;

/// Schema, applied idempotently at startup.
const SCHEMA_SQL: &str = r#"
-- Enable WAL mode for better concurrent access
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tweets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    tweet_id INTEGER NOT NULL REFERENCES tweets(id),
    user_id INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS follows (
    follower_id INTEGER NOT NULL REFERENCES users(id),
    following_id INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, following_id)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_tweets_recent
    ON tweets(created_at DESC, id DESC);

CREATE INDEX IF NOT EXISTS idx_tweets_owner
    ON tweets(owner_id);

CREATE INDEX IF NOT EXISTS idx_comments_tweet
    ON comments(tweet_id, created_at);

CREATE INDEX IF NOT EXISTS idx_comments_user
    ON comments(user_id);

CREATE INDEX IF NOT EXISTS idx_follows_following
    ON follows(following_id);
"#;

/// Typed store failures, translated to API errors at the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("caller does not own the record")]
    NotOwner,
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Store handle. All access is serialized through one WAL-mode connection;
/// each method acquires the lock for the duration of its statements and
/// releases it unconditionally on return.
pub struct Db {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open (or create) the database and apply the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();

        if journal_mode.to_lowercase() != "wal" {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        info!("📊 Database initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Creation timestamps, RFC 3339 in UTC.
pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Detect a UNIQUE-constraint violation so a concurrent duplicate insert
/// surfaces as a typed conflict instead of an opaque failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub(crate) fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        created_at: row.get(5)?,
    })
}

/// Column list matching [`user_from_row`].
pub(crate) const USER_COLUMNS: &str = "id, name, email, password_hash, is_active, created_at";
