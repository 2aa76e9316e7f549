//! Error types for weave-merge
//!
//! Every error in this crate is fatal for the run: a merge over a malformed
//! or unreadable stream has no safe partial result.

use thiserror::Error;

use weave_core::ParseError;

/// Errors that abort a merge
#[derive(Debug, Error)]
pub enum MergeError {
    /// A source could not be opened or read
    #[error("source {source_name}: I/O error: {message}")]
    Io {
        source_name: String,
        message: String,
    },

    /// A source contained a malformed line
    #[error("source {source_name}, line {line}: {error}")]
    Parse {
        source_name: String,
        line: u64,
        #[source]
        error: ParseError,
    },

    /// The output could not be written
    #[error("sink error: {0}")]
    Sink(String),

    /// Teardown time cannot be placed after the last event
    #[error("teardown error: {0}")]
    Finalize(String),
}

impl MergeError {
    /// Create a new Io error for a source
    pub fn io(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a new Parse error for a source line
    pub fn parse(source_name: impl Into<String>, line: u64, error: ParseError) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            line,
            error,
        }
    }

    /// Name of the source that failed, if the error came from a source
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::Io { source_name, .. } | Self::Parse { source_name, .. } => Some(source_name),
            Self::Sink(_) | Self::Finalize(_) => None,
        }
    }
}

impl From<std::io::Error> for MergeError {
    fn from(err: std::io::Error) -> Self {
        MergeError::Sink(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = MergeError::parse(
            "launcher",
            7,
            ParseError::FieldCount {
                expected: 4,
                actual: 1,
            },
        );
        let message = err.to_string();
        assert!(message.contains("launcher"));
        assert!(message.contains("line 7"));
        assert_eq!(err.source_name(), Some("launcher"));
    }

    #[test]
    fn test_io_error_conversion_is_sink() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: MergeError = io_err.into();
        assert!(matches!(err, MergeError::Sink(_)));
        assert_eq!(err.source_name(), None);
    }
}
