//! Errors raised while snapshotting jars and computing recompilation sets.
//!
//! Per-class and per-jar analysis failures never surface here: they are
//! absorbed into dependency-to-all. What remains are infrastructure failures.

use std::path::PathBuf;

use super::error_code::{self, RecompErrorCode};
use super::StorageError;
use crate::types::hash::ContentHash;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A previous compilation references a jar hash that no cache tier holds.
    #[error("No jar snapshot stored for {path} (hash {hash}); the previous compilation record is unusable")]
    MissingJarSnapshot { path: PathBuf, hash: ContentHash },

    #[error("Malformed class file: {message}")]
    ClassFormat { message: String },

    #[error("Cannot read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AnalysisError {
    /// A malformed class file.
    pub fn class_format(message: impl Into<String>) -> Self {
        Self::ClassFormat {
            message: message.into(),
        }
    }
}

impl RecompErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingJarSnapshot { .. } => error_code::MISSING_JAR_SNAPSHOT,
            Self::ClassFormat { .. } => error_code::CLASS_FORMAT_ERROR,
            Self::Archive { .. } => error_code::ARCHIVE_ERROR,
            Self::Io(_) => error_code::IO_ERROR,
            Self::Storage(e) => e.error_code(),
        }
    }
}
