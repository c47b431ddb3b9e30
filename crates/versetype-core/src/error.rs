//! Error types for Versetype.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersetypeError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Passage {position} out of range: collection has {total} passages")]
    PassageOutOfRange { position: String, total: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Corpus contains no passages")]
    EmptyCorpus,

    #[error("Corpus error: {0}")]
    Corpus(String),
}

impl VersetypeError {
    /// Whether this error came from the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            VersetypeError::Storage(_)
                | VersetypeError::DatabaseError(_)
                | VersetypeError::IoError(_)
                | VersetypeError::JsonError(_)
        )
    }

    /// Whether this error should be shown to the user as a rejected request.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            VersetypeError::UnknownCollection(_) | VersetypeError::PassageOutOfRange { .. }
        )
    }
}
