//! Storage-layer errors for the persistent key-value stores and record codec.

use super::error_code::{self, RecompErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Store locked: {message}")]
    Locked { message: String },

    #[error("Record corrupt: {details}")]
    RecordCorrupt { details: String },

    /// The value factory of a get-or-insert transaction failed; nothing was stored.
    #[error("Transaction aborted by value factory")]
    Aborted,
}

impl RecompErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Locked { .. } => error_code::STORE_LOCKED,
            Self::RecordCorrupt { .. } => error_code::RECORD_CORRUPT,
            Self::Io { .. } => error_code::IO_ERROR,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
