//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid logo: {0}")]
    InvalidLogo(String),

    #[error("Malformed letter body: {0}")]
    Markup(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
