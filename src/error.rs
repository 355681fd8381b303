//! Error types for MiniDB
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using MiniDbError
pub type Result<T> = std::result::Result<T, MiniDbError>;

/// Unified error type for MiniDB operations
#[derive(Debug, Error)]
pub enum MiniDbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O failure tagged with the operation and file it happened on
    #[error("IO error during {op} on {}: {source}", .path.display())]
    IoAt {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Log Format Errors
    // -------------------------------------------------------------------------
    #[error("Invalid record at offset {offset}: {reason}")]
    InvalidRecord { offset: u64, reason: String },

    /// Declared key/value sizes run past the end of the log
    #[error("Truncated record at offset {offset}: needs {needed} bytes, {available} available")]
    TruncatedRecord {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Scan reached the log frontier. Internal to scans, never returned by `Store`.
    #[error("End of log")]
    EndOfLog,

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    /// Key or value length does not fit the u32 size fields
    #[error("{what} of {len} bytes exceeds the maximum record field size")]
    TooLarge { what: &'static str, len: usize },
}

impl MiniDbError {
    /// Wrap an `io::Error` with the operation and path that produced it
    pub(crate) fn io_at(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MiniDbError::IoAt {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(offset: u64, reason: impl Into<String>) -> Self {
        MiniDbError::InvalidRecord {
            offset,
            reason: reason.into(),
        }
    }

    /// True for both malformed and truncated records
    pub fn is_invalid_record(&self) -> bool {
        matches!(
            self,
            MiniDbError::InvalidRecord { .. } | MiniDbError::TruncatedRecord { .. }
        )
    }

    pub fn is_key_not_found(&self) -> bool {
        matches!(self, MiniDbError::KeyNotFound)
    }
}
