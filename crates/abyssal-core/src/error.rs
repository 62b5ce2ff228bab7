//! Error types for abyssal-stats
//!
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use abyssal_core::error::{AbyssalError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to AbyssalError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::RunId;

/// Main error type for abyssal-stats operations
///
/// Data-shape problems inside a snapshot (an absent delete target, a
/// one-token category, an unparseable loot segment) are never reported here;
/// they degrade silently. These variants cover collaborator failures and
/// contract violations.
#[derive(Error, Debug)]
pub enum AbyssalError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid timestamp or day format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// A run record violates one of its invariants
    #[error("Invalid run record {id}: {reason}")]
    InvalidRecord {
        /// Identity of the offending record
        id: RunId,
        /// What is wrong with it
        reason: String,
    },

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// No persisted record matches the given identity
    #[error("Run not found in record store: {0}")]
    RecordNotFound(RunId),

    /// A bulk reload or delete is already running against this dataset
    #[error("A reload is already in progress")]
    ReloadInProgress,

    /// The bulk-analysis collaborator failed
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in abyssal-stats
pub type Result<T> = std::result::Result<T, AbyssalError>;
