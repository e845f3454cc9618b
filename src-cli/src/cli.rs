//! Command line arguments

use clap::{Args, Parser, Subcommand};
use render_model::PaperSize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "letterhead")]
#[command(version, about = "Compose letterhead letters and export them to PDF", long_about = None)]
#[command(after_help = "EXAMPLES:
    letterhead init letter.json                  Write a starter letter
    letterhead export letter.json -o letter.pdf  Export to PDF
    letterhead export letter.json -o out.pdf --preset executive-dark --format letter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export a letter file to a paginated PDF
    Export(ExportArgs),

    /// List the built-in letterhead presets
    Presets,

    /// Write a starter letter file
    Init {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Letter file (JSON with `profile` and `content`)
    #[arg(value_name = "LETTER")]
    pub letter: PathBuf,

    /// Where to write the PDF
    #[arg(short, long, value_name = "PDF")]
    pub output: PathBuf,

    /// Apply a preset's colors, font and layout on top of the profile
    #[arg(long, value_name = "ID")]
    pub preset: Option<String>,

    /// Export settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Supersampling factor, overriding settings
    #[arg(long, value_name = "FACTOR")]
    pub scale: Option<f32>,

    /// Preview zoom the document is held at; export output does not depend on it
    #[arg(long, value_name = "FACTOR")]
    pub zoom: Option<f32>,

    /// Paper size, overriding settings
    #[arg(long, value_name = "a4|letter")]
    pub format: Option<PaperSize>,

    /// Give up after this many seconds
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,
}
