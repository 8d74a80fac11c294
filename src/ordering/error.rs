use std::time::Duration;
use thiserror::Error;

/// Errors from a reorder batch
#[derive(Debug, Error)]
pub enum ReorderError {
    /// Rejected before any write
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transaction was rolled back
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Reorder did not finish within {0:?}")]
    Timeout(Duration),

    /// Strict mode only: the id matched no row and the batch was rolled back
    #[error("Unknown id: {0}")]
    UnknownId(i64),

    #[error("Invalid collection: {0}")]
    InvalidCollection(String),
}

impl From<crate::database::manager::DatabaseError> for ReorderError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        match err {
            crate::database::manager::DatabaseError::Sqlx(e) => ReorderError::Persistence(e),
            other => ReorderError::InvalidCollection(other.to_string()),
        }
    }
}
