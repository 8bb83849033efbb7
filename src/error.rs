//! Error types for the affect pipeline.
//!
//! Only construction and configuration paths are fallible. Per-frame
//! processing never returns an error; it degrades to documented defaults.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value rejected at construction time
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Landmark layout size other than 68 or 468
    #[error("Invalid point count: {0} (expected 68 or 468)")]
    InvalidPointCount(usize),

    /// Config or session (de)serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
