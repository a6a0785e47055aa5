//! Error types for Daily Bread.
//!
//! Library crates use [`DailyBreadError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Daily Bread operations.
#[derive(Debug, thiserror::Error)]
pub enum DailyBreadError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// JSON/HTML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The reading schedule could not be read or has an unexpected shape.
    #[error("schedule error: {message}")]
    Schedule { message: String },

    /// Service-account authentication failed.
    #[error("auth error: {message}")]
    Auth { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, bad date, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DailyBreadError>;

impl DailyBreadError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a schedule error from any displayable message.
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule {
            message: msg.into(),
        }
    }

    /// Create an auth error from any displayable message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DailyBreadError::config("DISCORD_WEBHOOK_URL is not set");
        assert_eq!(err.to_string(), "config error: DISCORD_WEBHOOK_URL is not set");

        let err = DailyBreadError::schedule("missing column 'Date'");
        assert!(err.to_string().starts_with("schedule error:"));
        assert!(err.to_string().contains("'Date'"));
    }

    #[test]
    fn io_error_includes_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DailyBreadError::io("/tmp/service_account.json", source);
        assert!(err.to_string().contains("service_account.json"));
    }
}
