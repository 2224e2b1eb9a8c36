use thiserror::Error;

use crate::model::election::ElectionStage;
use crate::model::id::ParseIdError;
use crate::store::RecordKey;

/// Everything that can go wrong when submitting an operation to the ledger.
///
/// Every variant is local and recoverable: a failed operation leaves the
/// record set exactly as it was, so the caller is always free to correct
/// the input and retry.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Operation requires stage {expected}, election is at {actual}")]
    InvalidStage {
        expected: ElectionStage,
        actual: ElectionStage,
    },
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: ElectionStage,
        to: ElectionStage,
    },
    #[error("Record already exists at key {0}")]
    AlreadyExists(RecordKey),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
    #[error(transparent)]
    IdParse(#[from] ParseIdError),
}

pub type Result<T> = std::result::Result<T, Error>;
