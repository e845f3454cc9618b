//! Raster - content tree rasterization
//!
//! Lays a content tree out, paints it as SVG and renders that with resvg
//! into a single RGB capture of the whole tree.

mod capture;
mod error;
mod rasterizer;
pub mod svg;

pub use capture::*;
pub use error::*;
pub use rasterizer::*;
