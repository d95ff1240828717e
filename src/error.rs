// src/error.rs

//! Unified error handling for the writeups service.

use thiserror::Error;

/// Result type alias for writeups operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Listing or content is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Archive creation failed
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory walk failed
    #[error("Walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a not-found error for the given listing handle or locator.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Expected absence. Drives catalog filtering and is not logged as a failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// The network or filesystem call itself failed.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(_) | Self::Json(_) => true,
            Self::Io(e) => e.kind() != std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(AppError::not_found("ctfA/chal1").is_not_found());
        assert!(!AppError::not_found("ctfA/chal1").is_transport());

        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.is_not_found());
        assert!(!io.is_transport());
    }

    #[test]
    fn test_transport_classification() {
        let io = AppError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(io.is_transport());
        assert!(!io.is_not_found());
        assert!(!AppError::config("bad").is_transport());
    }
}
