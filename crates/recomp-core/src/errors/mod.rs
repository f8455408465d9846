//! Error types for every recomp subsystem.
//! One enum per concern; each maps to a stable string code via `RecompErrorCode`.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use storage_error::StorageError;
