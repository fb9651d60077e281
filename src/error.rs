//! Centralized error types for mailverdict.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailverdict library.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The container or header block is malformed.
    #[error("Format error: {0}")]
    Format(String),

    /// The file extension is neither `.msg` nor `.eml`.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file is larger than the configured limit. Not a failure: the
    /// batch driver turns this into a skip.
    #[error("'{file}' is {size} bytes, over the {limit} byte limit")]
    SizeLimitExceeded { file: String, size: u64, limit: u64 },
}

/// Convenience alias for `Result<T, AnalyzeError>`.
pub type Result<T> = std::result::Result<T, AnalyzeError>;

impl AnalyzeError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for errors caused by the file's content or declared type.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_) | Self::UnsupportedFormat(_))
    }
}
