//! Store - settings, letter files, and PDF page assembly
//!
//! This crate handles letter file I/O, export settings persistence, and
//! the PDF writer the exporter places captured pages into.

mod error;
mod file_io;
mod settings;
pub mod pdf;

pub use error::*;
pub use file_io::*;
pub use settings::*;
