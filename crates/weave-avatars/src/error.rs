//! Error types for weave-avatars
//!
//! None of these abort a run. The fetcher logs them per handle and moves on.

use thiserror::Error;

/// Errors that can occur while collecting one avatar
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Filesystem error reading a local image or writing an artifact
    #[error("I/O error: {0}")]
    Io(String),

    /// Request to the identity service or image host failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Lookup response could not be understood
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Image bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Normalized image could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Handle cannot be used as an artifact file name
    #[error("Invalid handle for artifact name: {0:?}")]
    InvalidHandle(String),
}

impl From<std::io::Error> for AvatarError {
    fn from(err: std::io::Error) -> Self {
        AvatarError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AvatarError {
    fn from(err: reqwest::Error) -> Self {
        AvatarError::Http(err.to_string())
    }
}
