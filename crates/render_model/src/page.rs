//! Physical page formats

use crate::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    pub fn format(self) -> PageFormat {
        match self {
            PaperSize::A4 => PageFormat::a4(),
            PaperSize::Letter => PageFormat::letter(),
        }
    }
}

impl FromStr for PaperSize {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" | "us-letter" => Ok(PaperSize::Letter),
            other => Err(RenderError::InvalidPageFormat(format!(
                "unknown paper size '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::A4 => write!(f, "a4"),
            PaperSize::Letter => write!(f, "letter"),
        }
    }
}

/// Physical page size plus the CSS pixel width content is laid out at
///
/// The same `raster_width_px` is used both to lay out a document and as the
/// capture width, so one page's height in pixels follows from the aspect
/// ratio alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFormat {
    pub width_mm: f32,
    pub height_mm: f32,
    pub raster_width_px: u32,
    pub dpi: f32,
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageFormat {
    /// A4 portrait at 96 DPI
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            raster_width_px: 794,
            dpi: 96.0,
        }
    }

    /// US Letter portrait at 96 DPI
    pub fn letter() -> Self {
        Self {
            width_mm: 215.9,
            height_mm: 279.4,
            raster_width_px: 816,
            dpi: 96.0,
        }
    }

    /// Check dimensions are usable
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.width_mm) || !positive(self.height_mm) || self.raster_width_px == 0 {
            return Err(RenderError::InvalidPageFormat(format!(
                "{}x{} mm at {} px",
                self.width_mm, self.height_mm, self.raster_width_px
            )));
        }
        Ok(())
    }

    /// CSS pixels per millimetre at the raster width
    pub fn px_per_mm(&self) -> f32 {
        self.raster_width_px as f32 / self.width_mm
    }

    /// Convert millimetres to CSS pixels at the raster width
    pub fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.px_per_mm()
    }

    /// One page's height in CSS pixels (A4: about 1122.97)
    pub fn page_height_px(&self) -> f32 {
        self.raster_width_px as f32 / self.width_mm * self.height_mm
    }

    /// Minimum content height that still fits on one page
    ///
    /// Rounded down so a one-page minimum never spills onto a second page.
    pub fn min_content_height_px(&self) -> f32 {
        self.page_height_px().floor()
    }

    /// Number of pages a layout of the given CSS pixel height spans
    pub fn pages_for_height(&self, height_px: f32) -> usize {
        if !height_px.is_finite() || height_px <= 0.0 {
            return 1;
        }
        ((height_px / self.page_height_px()).ceil() as usize).max(1)
    }
}
