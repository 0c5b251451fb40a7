//! Error types for jbundle
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using BundleError
pub type Result<T> = std::result::Result<T, BundleError>;

/// Unified error type for bundle operations
#[derive(Debug, Error)]
pub enum BundleError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    /// Magic mismatch or unsupported version at open time. Fatal, no partial
    /// recovery is attempted.
    #[error("invalid bundle format: {0}")]
    InvalidFormat(String),

    /// Name encodes to more than 255 bytes; rejected before any bytes are
    /// written.
    #[error("name too long: {len} bytes (max 255)")]
    NameTooLong { len: usize },

    /// Content does not fit the 32-bit length field.
    #[error("payload too large: {len} bytes")]
    PayloadTooLarge { len: u64 },

    // -------------------------------------------------------------------------
    // Structural Errors
    // -------------------------------------------------------------------------
    /// A stored offset points outside the file, a record overruns end-of-file,
    /// or a chain loops back on itself.
    #[error("corrupt container: {0}")]
    CorruptContainer(String),

    /// A new record would start beyond the 32-bit offset range.
    #[error("bundle full: record offset {0} exceeds the 32-bit offset range")]
    BundleFull(u64),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}
