//! SQLite storage bootstrap, schema migration and unit-of-work scoping.
//!
//! # Responsibility
//! - Open and configure store connections from an explicit [`StoreConfig`].
//! - Apply schema migrations in deterministic order.
//! - Pair each write use case with one connection and one transaction.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No application data is read or written before migrations succeed.
//! - Every opened connection is closed exactly once, on every exit path.
//!
//! [`StoreConfig`]: crate::config::StoreConfig

use std::path::PathBuf;
use thiserror::Error;

pub mod migrations;
mod open;
mod scope;

pub use scope::{ConnectionManager, Scope, StoreConnection};

pub type DbResult<T> = Result<T, DbError>;

/// Schema bootstrap failure on an already-open connection.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

/// A connection or scope could not be acquired.
///
/// Fatal to the use case that hit it; never retried by the core.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to open store `{}`: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: tokio_rusqlite::Error,
    },
    #[error("failed to bootstrap store `{}`: {source}", .path.display())]
    Bootstrap { path: PathBuf, source: DbError },
    #[error("failed to begin transaction on `{}`: {source}", .path.display())]
    Begin {
        path: PathBuf,
        source: tokio_rusqlite::Error,
    },
}

/// A statement failed, or its result could not be decoded, inside an open
/// connection.
#[derive(Debug, Error)]
pub enum StoreFault {
    #[error("store call failed: {0}")]
    Store(#[from] tokio_rusqlite::Error),
    #[error("invalid persisted employee data: {0}")]
    InvalidData(String),
    #[error("employee has no identifier; only stored records can be updated")]
    MissingIdentifier,
}

impl From<rusqlite::Error> for StoreFault {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(tokio_rusqlite::Error::Rusqlite(value))
    }
}
