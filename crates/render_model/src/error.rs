//! Error types for render model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid page format: {0}")]
    InvalidPageFormat(String),

    #[error("Image could not be decoded: {0}")]
    Image(String),

    #[error(transparent)]
    Model(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
