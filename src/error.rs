// src/error.rs

//! Unified error handling for the harvester.

use std::fmt;

use thiserror::Error;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No feed container could be resolved
    #[error("Feed container not found: {0}")]
    ContainerMissing(String),

    /// Building a single record failed
    #[error("Extraction error for entry {entry}: {message}")]
    Extraction { entry: String, message: String },

    /// Requesting or measuring more content failed
    #[error("Advance error: {0}")]
    Advance(String),

    /// The scrape loop task ended abnormally
    #[error("Scrape task error: {0}")]
    Task(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a per-entry extraction error.
    pub fn extraction(entry: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            entry: entry.into(),
            message: message.to_string(),
        }
    }

    /// Create an advance error.
    pub fn advance(message: impl fmt::Display) -> Self {
        Self::Advance(message.to_string())
    }
}
