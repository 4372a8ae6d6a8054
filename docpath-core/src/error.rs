//! Error types and result types for document store operations.
//!
//! Every fallible operation returns a [`DocumentStoreResult<T>`]. Reading something that
//! does not exist yields [`DocumentStoreError::NotFound`]; deleting something that does
//! not exist is never an error.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// No document or collection exists at the given path.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A path has the wrong number of segments for the kind it is used as.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// A query constraint could not be built, e.g. an unsupported operator.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Serialization/deserialization error when converting between typed data and BSON/JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An unexpected failure inside a backend.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DocumentStoreError {
    /// Returns `true` for [`DocumentStoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentStoreError::NotFound(_))
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
