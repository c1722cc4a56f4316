//! Error types for marktree

use thiserror::Error;

/// Main error type for marktree operations
#[derive(Error, Debug)]
pub enum MarktreeError {
    /// IO error while pulling input from a byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The grammar engine could not finalize a document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Render error during output generation
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type alias for marktree operations
pub type Result<T> = std::result::Result<T, MarktreeError>;
