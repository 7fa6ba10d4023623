use std::time::Duration;

use crate::constants::ERR_RECORD_NOT_FOUND;
use crate::validator::Validator;

/// Backing-store faults. Never retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid expense row: {0}")]
    InvalidRow(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("failed validation: {0}")]
    Validation(Validator),
    /// The id does not exist for this owner, or the version no longer
    /// matches. Callers re-fetch to find out which.
    #[error("{}", ERR_RECORD_NOT_FOUND)]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<libsql::Error> for ExpenseError {
    fn from(err: libsql::Error) -> Self {
        ExpenseError::Store(StoreError::Database(err))
    }
}

pub type ExpenseResult<T> = Result<T, ExpenseError>;
