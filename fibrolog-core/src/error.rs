//! Error types for fibrolog-core
//!
//! The analytics engine itself never fails. These errors come from the
//! boundaries around it: configuration, logging setup and entry loading.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the fibrolog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry file could not be parsed
    #[error("parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Invalid glob pattern for entry files
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging setup error
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type alias for fibrolog-core
pub type Result<T> = std::result::Result<T, Error>;
