//! Render Model - content tree, layout and live document
//!
//! This crate holds the measurable content tree a letter is composed into,
//! lays it out into positioned draw primitives, and models the live
//! document the editor previews (zoom, staging copies, export exclusion).

mod compose;
mod document;
mod error;
mod geometry;
mod layout;
mod node;
mod page;
pub mod text;
mod zoom;

pub use compose::*;
pub use document::*;
pub use error::*;
pub use geometry::*;
pub use layout::*;
pub use node::*;
pub use page::*;
pub use zoom::*;
