//! Error types for askdocs.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, backend transport, search,
//! prompt construction and serialization.

use thiserror::Error;

/// Unified error type for askdocs.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Library code never panics; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backend answered with a non-success HTTP status
    #[error("HTTP {status}: {reason}")]
    Http {
        /// Numeric status code (e.g. 429)
        status: u16,
        /// Reason phrase for the status (e.g. "Too Many Requests")
        reason: String,
    },

    /// LLM provider errors that carry no HTTP status (transport, decoding)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search backend errors and malformed search responses
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
