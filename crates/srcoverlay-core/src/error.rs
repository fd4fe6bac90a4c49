//! Error types for srcoverlay

use thiserror::Error;

/// srcoverlay error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Feature error: {0}")]
    Feature(String),
}

/// Result type alias for srcoverlay
pub type Result<T> = std::result::Result<T, Error>;
