// src/error.rs

//! Unified error handling for the deadline engine.
//!
//! The derivation path itself never fails; these errors cover the ambient
//! surface around it (configuration, files, HTTP client setup, CLI input).

use std::fmt;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
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

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Directory lookup error
    #[error("Directory error for {context}: {message}")]
    Directory { context: String, message: String },
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a directory error with context.
    pub fn directory(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Directory {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
