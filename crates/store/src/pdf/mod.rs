//! PDF page assembly
//!
//! - `objects`: PDF object model and serialization
//! - `writer`: numbered objects, xref table and trailer
//! - `content`: content stream operators
//! - `images`: raw RGB image XObjects
//! - `document`: info dictionary, page tree, unit conversion
//! - `options`: export options
//! - `assembler`: the [`PageAssembler`] / [`PageDocument`] seam and its PDF implementation

mod assembler;
mod content;
mod document;
mod images;
mod objects;
mod options;
mod writer;

pub use assembler::*;
pub use content::ContentStream;
pub use document::{mm_to_pt, pdf_date, DocumentInfo, MediaBox, PdfVersion, PT_PER_MM};
pub use images::{ColorSpace, ImageData};
pub use objects::{PdfDictionary, PdfObject, PdfStream, PdfString};
pub use options::*;
pub use writer::{PdfError, PdfWriter, Result};
