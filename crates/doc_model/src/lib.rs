//! Document Model - Letter domain types
//!
//! This crate provides the data the letterhead editor works with: the
//! company profile that drives the letterhead design, the letter content
//! itself (including the rich-text body), and the built-in presets.

mod color;
mod error;
mod letter;
mod logo;
pub mod markup;
mod node_id;
mod preset;
mod profile;

pub use color::*;
pub use error::*;
pub use letter::*;
pub use logo::*;
pub use node_id::*;
pub use preset::*;
pub use profile::*;
