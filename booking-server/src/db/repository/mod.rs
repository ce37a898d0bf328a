//! Repository Module
//!
//! The booking admission core and its result types. All storage access is
//! explicit parameterized queries; write operations run inside scoped
//! transactions that commit only on the success path.

pub mod booking;

pub use booking::{
    AdmitOutcome, Availability, BookingRepository, RejectReason, RescheduleOutcome, SlotStatus,
};

use crate::db::DbService;
use sqlx::SqlitePool;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled before commit")]
    Cancelled,
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Storage(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Unique-index violation: a lost admission race, not an infrastructure error.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// Foreign-key violation: the referenced customer or table row is missing.
pub(crate) fn is_fk_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: DbService,
}

impl BaseRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn read(&self) -> &SqlitePool {
        &self.db.read_pool
    }

    pub fn write(&self) -> &SqlitePool {
        &self.db.write_pool
    }
}
