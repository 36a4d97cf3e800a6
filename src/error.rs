use crate::domain::triage::{MissingFields, TriageAction};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Complete triage before {action}: {missing}.")]
    IncompleteTriage {
        action: TriageAction,
        missing: MissingFields,
    },

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidStorageKey(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardError {
    /// True for the rejections the board surfaces as a transient message
    /// rather than a failure.
    pub fn is_triage_rejection(&self) -> bool {
        matches!(self, Self::IncompleteTriage { .. })
    }
}
