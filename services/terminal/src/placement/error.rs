//! Placement service errors.

use quayside_id::{ContainerId, YardId};
use quayside_yard::{PlacementError, YardError};
use thiserror::Error;

use crate::db::DbError;

/// Errors from yard queries and location writes.
#[derive(Debug, Error)]
pub enum PlacementServiceError {
    /// The location breaks a yard rule. Nothing was written.
    #[error(transparent)]
    InvalidPlacement(#[from] PlacementError),

    /// A stored yard has dimensions the engine cannot use.
    #[error("stored yard is invalid: {0}")]
    InvalidYard(#[from] YardError),

    #[error("yard not found: {0}")]
    UnknownYard(YardId),

    #[error("container not found: {0}")]
    UnknownContainer(ContainerId),

    /// A resize would leave stored locations outside the yard.
    #[error("yard {yard_id} has locations outside {max_rows} rows, {max_columns} columns, {max_tiers} tiers")]
    ResizeWouldStrand {
        yard_id: YardId,
        max_rows: u32,
        max_columns: u32,
        max_tiers: u32,
    },

    #[error("yard name already in use: {0}")]
    NameTaken(String),

    /// Lost a race with another write; the request can be retried.
    #[error("conflicting concurrent update, retry the request")]
    Conflict,

    /// The blocking slot search panicked or was cancelled.
    #[error("slot search failed: {0}")]
    SearchTask(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Database(DbError),
}

impl From<DbError> for PlacementServiceError {
    fn from(e: DbError) -> Self {
        if e.is_retryable_conflict() {
            Self::Conflict
        } else {
            Self::Database(e)
        }
    }
}

impl From<sqlx::Error> for PlacementServiceError {
    fn from(e: sqlx::Error) -> Self {
        DbError::from(e).into()
    }
}
