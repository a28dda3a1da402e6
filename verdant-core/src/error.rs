//! Error types for the Verdant core library.

use thiserror::Error;

/// Top-level error type for loading configuration and location data.
#[derive(Error, Debug)]
pub enum VerdantError {
    /// Configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The location dataset is malformed.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// JSON decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, VerdantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = VerdantError::Dataset("duplicate location id 7".into());
        assert_eq!(err.to_string(), "Dataset error: duplicate location id 7");

        let err = VerdantError::Config("bad toml".into());
        assert_eq!(err.to_string(), "Configuration error: bad toml");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: VerdantError = io.into();
        assert!(matches!(err, VerdantError::Io(_)));
        assert!(err.to_string().contains("missing.json"));
    }
}
