//! Error types for export

use raster::RasterError;
use store::pdf::PdfError;
use thiserror::Error;

/// Why an export produced no file
///
/// The display text is meant to be shown to the user as is.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not capture the letter: {0}")]
    Capture(#[from] RasterError),

    #[error("Could not write the PDF: {0}")]
    Assembly(#[from] PdfError),

    #[error("An export of this document is already in progress")]
    AlreadyExporting,

    #[error("Invalid export format: {0}")]
    InvalidFormat(String),

    #[error("Export was cancelled: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
