//! Stable error codes surfaced to callers that report failures by code.

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const STORE_LOCKED: &str = "STORE_LOCKED";
pub const RECORD_CORRUPT: &str = "RECORD_CORRUPT";
pub const IO_ERROR: &str = "IO_ERROR";
pub const MISSING_JAR_SNAPSHOT: &str = "MISSING_JAR_SNAPSHOT";
pub const CLASS_FORMAT_ERROR: &str = "CLASS_FORMAT_ERROR";
pub const ARCHIVE_ERROR: &str = "ARCHIVE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

/// Maps an error value to one of the constants above.
pub trait RecompErrorCode {
    fn error_code(&self) -> &'static str;
}
