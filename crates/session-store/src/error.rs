//! Error types for session storage

/// Errors from session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("session file parse error: {0}")]
    Parse(String),

    #[error("malformed access token: {0}")]
    Claims(String),
}

/// Result alias for session storage operations.
pub type Result<T> = std::result::Result<T, Error>;
