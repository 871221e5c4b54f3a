// tupledistinct-core/src/error.rs
// Error types for the library surface (sources, collections, settings)

use thiserror::Error;

/// Errors raised by the built-in sources, the in-memory collection and the
/// settings loader.
///
/// The aggregation engine never produces one of these on its own: it is
/// generic over the source's error type and hands source failures back
/// untouched.
#[derive(Error, Debug)]
pub enum DistinctError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DistinctError {
    fn from(err: serde_json::Error) -> Self {
        DistinctError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DistinctError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err: DistinctError = io.into();
        assert!(matches!(err, DistinctError::Io(_)));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DistinctError = parse.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
