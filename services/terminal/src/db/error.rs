//! Database error types.

use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// Migration directory not found in the current environment.
    #[error("migration directory not found; tried {tried}. Last error: {last_error}. Run from repo root or services/terminal.")]
    MigrationDirNotFound { tried: String, last_error: String },
}

impl DbError {
    fn sqlstate(&self) -> Option<String> {
        match self {
            Self::Query(sqlx::Error::Database(db_err)) => db_err.code().map(|c| c.into_owned()),
            _ => None,
        }
    }

    /// A UNIQUE constraint rejected the write.
    pub fn is_unique_violation(&self) -> bool {
        self.sqlstate().as_deref() == Some(UNIQUE_VIOLATION)
    }

    /// The transaction lost a serialization race or deadlocked; retrying once is safe.
    pub fn is_retryable_conflict(&self) -> bool {
        matches!(
            self.sqlstate().as_deref(),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
        )
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        Self::Query(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_conflicts() {
        let err = DbError::Query(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation());
        assert!(!err.is_retryable_conflict());
    }
}
