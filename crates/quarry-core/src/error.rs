//! Error types for Quarry

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Quarry operations
#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{format} parse error: {message}")]
    ParseError { format: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Scene has no mesh: {0}")]
    NoGeometry(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl QuarryError {
    /// Shorthand for a reader failure in the named format
    pub fn parse(format: impl Into<String>, message: impl ToString) -> Self {
        QuarryError::ParseError {
            format: format.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

impl From<toml::de::Error> for QuarryError {
    fn from(err: toml::de::Error) -> Self {
        QuarryError::TomlParseError(err.to_string())
    }
}
