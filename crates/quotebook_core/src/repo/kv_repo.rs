//! Key/value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide string key to string value storage, the shape the quote
//!   collection and the selected filter are persisted in.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Keys are non-blank; blank keys are rejected before any SQL runs.
//! - `set` replaces the whole value for a key (no partial writes).

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key holding the JSON array of quote records.
pub const QUOTES_KEY: &str = "quotes";
/// Key holding the plain-text selected category filter.
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key/value persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidKey(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for flat key/value persistence.
pub trait KeyValueRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed key/value repository.
///
/// Owns its connection so the store can be moved onto a sync thread.
pub struct SqliteKvRepository {
    conn: Connection,
}

impl SqliteKvRepository {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueRepository for SqliteKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let key = checked_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = checked_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

fn checked_key(key: &str) -> RepoResult<&str> {
    if key.trim().is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::{KeyValueRepository, RepoError, SqliteKvRepository};
    use crate::db::open_db_in_memory;

    fn repo() -> SqliteKvRepository {
        SqliteKvRepository::new(open_db_in_memory().expect("in-memory db should open"))
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        assert_eq!(repo().get("quotes").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let repo = repo();
        repo.set("quotes", "[]").unwrap();
        repo.set("quotes", "[1]").unwrap();
        assert_eq!(repo.get("quotes").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        let err = repo().set("  ", "x").unwrap_err();
        assert!(matches!(err, RepoError::InvalidKey(_)));
    }
}
