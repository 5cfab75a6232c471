// lib/src/errors.rs

use models::errors::ValidationError;
pub use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A document in '{collection}' already has {field} = {value}")]
    Duplicate {
        collection: String,
        field: String,
        value: String,
    },
    #[error("Document '{id}' already exists in '{collection}'")]
    AlreadyExists { collection: String, id: String },
    #[error("Invalid update: {0}")]
    InvalidPatch(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("An internal error occurred: {0}")]
    Internal(String),
}

impl StorageError {
    /// True for errors caused by the submitted data rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::Validation(_)
                | StorageError::Duplicate { .. }
                | StorageError::AlreadyExists { .. }
                | StorageError::InvalidPatch(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
