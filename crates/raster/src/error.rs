//! Error types for rasterization

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    /// The content has no usable size
    #[error("Content could not be measured: {0}")]
    Unmeasurable(String),

    /// An image whose pixels are not available for capture
    #[error("Image cannot be captured: {0}")]
    UnresolvedImage(String),

    #[error("Capture surface of {width}x{height} pixels is too large")]
    SurfaceTooLarge { width: u64, height: u64 },

    #[error("SVG rendering failed: {0}")]
    Svg(String),
}

pub type Result<T> = std::result::Result<T, RasterError>;
