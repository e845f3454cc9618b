//! Preview zoom

use serde::{Deserialize, Serialize};

/// Zoom factor of the on-screen preview
///
/// Purely visual: it is applied as a scale transform on the document root
/// and must never influence exported output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewZoom(f32);

impl PreviewZoom {
    pub const MIN: f32 = 0.2;
    pub const MAX: f32 = 1.5;
    pub const STEP: f32 = 0.1;
    /// Comfortable fixed zoom on wide screens
    pub const DESKTOP: f32 = 0.85;
    /// Horizontal space kept free around the page when fitting to width
    pub const FIT_MARGIN_PX: f32 = 32.0;
    /// Viewports narrower than this fit the page to their width
    pub const DESKTOP_BREAKPOINT_PX: f32 = 1024.0;

    /// Create a zoom, clamped to the supported range
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Zoom as a whole percentage
    pub fn percent(&self) -> u32 {
        (self.0 * 100.0).round() as u32
    }

    pub fn zoom_in(self) -> Self {
        Self::new(self.0 + Self::STEP)
    }

    pub fn zoom_out(self) -> Self {
        Self::new(self.0 - Self::STEP)
    }

    /// Scale that fits a page of `page_width_px` into the viewport, never above 1
    pub fn fit_to_width(viewport_width_px: f32, page_width_px: f32) -> Self {
        let available = viewport_width_px - Self::FIT_MARGIN_PX;
        Self::new((available / page_width_px).min(1.0))
    }

    /// Initial zoom for a viewport: fixed on desktop, fit on smaller screens
    pub fn for_viewport(viewport_width_px: f32, page_width_px: f32) -> Self {
        if viewport_width_px < Self::DESKTOP_BREAKPOINT_PX {
            Self::fit_to_width(viewport_width_px, page_width_px)
        } else {
            Self::new(Self::DESKTOP)
        }
    }
}

impl Default for PreviewZoom {
    fn default() -> Self {
        Self(Self::DESKTOP)
    }
}
