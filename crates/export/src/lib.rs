//! Export - paginated PDF export of letter content
//!
//! The live tree is copied, normalized to native scale and page width,
//! rasterized once, and the single capture is sliced across as many PDF
//! pages as its height needs.

mod cancel;
mod error;
mod exporter;
mod geometry;
mod service;
mod staging;

pub use cancel::CancelFlag;
pub use error::*;
pub use exporter::*;
pub use geometry::*;
pub use service::*;
pub use staging::*;
