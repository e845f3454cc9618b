//! Page geometry of a capture
//!
//! All quantities derive from the capture's own pixel size and the page
//! format in millimetres. The supersampling factor never enters: a page is
//! as tall, in capture pixels, as the capture is wide scaled by the page's
//! aspect ratio.

use crate::{ExportError, Result};
use render_model::PageFormat;

/// One page's window onto the capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub index: usize,
    /// Top of the window in capture pixels
    pub offset_px: f64,
    /// Height of the window in capture pixels; only the last may be short
    pub height_px: f64,
    /// Vertical placement of the whole capture on this page
    pub y_mm: f64,
}

/// Maps a capture onto pages of a format
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub capture_width: u32,
    pub capture_height: u32,
}

impl PageGeometry {
    pub fn new(format: &PageFormat, capture_width: u32, capture_height: u32) -> Result<Self> {
        format
            .validate()
            .map_err(|e| ExportError::InvalidFormat(e.to_string()))?;
        if capture_width == 0 || capture_height == 0 {
            return Err(ExportError::InvalidFormat(format!(
                "empty capture {}x{}",
                capture_width, capture_height
            )));
        }
        Ok(Self {
            width_mm: format.width_mm as f64,
            height_mm: format.height_mm as f64,
            capture_width,
            capture_height,
        })
    }

    /// One page's height in capture pixels
    pub fn page_height_px(&self) -> f64 {
        self.capture_width as f64 / self.width_mm * self.height_mm
    }

    /// Height of the whole capture when drawn at page width
    pub fn image_height_mm(&self) -> f64 {
        self.capture_height as f64 * self.width_mm / self.capture_width as f64
    }

    /// Pages needed to show the whole capture, at least one
    ///
    /// Any overflow past a page boundary, even a single row, starts a page.
    pub fn page_count(&self) -> usize {
        ((self.capture_height as f64 / self.page_height_px()).ceil() as usize).max(1)
    }

    /// Contiguous, non-overlapping windows covering the capture
    pub fn slices(&self) -> Vec<PageSlice> {
        let page_height = self.page_height_px();
        let total = self.capture_height as f64;
        (0..self.page_count())
            .map(|index| {
                let offset_px = index as f64 * page_height;
                PageSlice {
                    index,
                    offset_px,
                    height_px: page_height.min(total - offset_px),
                    y_mm: -(index as f64) * self.height_mm,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn a4(width: u32, height: u32) -> PageGeometry {
        PageGeometry::new(&PageFormat::a4(), width, height).unwrap()
    }

    #[test]
    fn test_a4_at_native_scale() {
        let geometry = a4(794, 2400);
        assert!((geometry.page_height_px() - 1122.97).abs() < 0.01);
        assert_eq!(geometry.page_count(), 3);

        let slices = geometry.slices();
        assert_eq!(slices.len(), 3);
        assert!((slices[2].height_px - 154.06).abs() < 0.05);
        assert_eq!(slices[1].y_mm, -297.0);
        assert_eq!(slices[2].y_mm, -594.0);
    }

    #[test]
    fn test_supersampled_capture_paginates_the_same() {
        // 2400 CSS px at 2.5x: 1985 x 6000
        let geometry = a4(1985, 6000);
        assert_eq!(geometry.page_count(), 3);
        let last = geometry.slices()[2].height_px / 2.5;
        assert!((last - 154.06).abs() < 0.5);
    }

    #[test]
    fn test_one_page_minimum() {
        assert_eq!(a4(794, 1).page_count(), 1);
        assert_eq!(a4(794, 1122).page_count(), 1);
        // Floor of one page at 2.5x still fits one page
        assert_eq!(a4(1985, (1122.0f64 * 2.5).ceil() as u32).page_count(), 1);
    }

    #[test]
    fn test_single_row_overflow_adds_a_page() {
        // 1123 > 1122.97: the last row would be clipped on one page
        let geometry = a4(794, 1123);
        assert_eq!(geometry.page_count(), 2);
        let slices = geometry.slices();
        assert!(slices[1].height_px > 0.0 && slices[1].height_px < 0.05);
        assert_eq!(a4(794, 2245).page_count(), 2);
        assert_eq!(a4(794, 2246).page_count(), 3);
    }

    #[test]
    fn test_letter_minimum_fits_one_page() {
        let format = PageFormat::letter();
        let width = (format.raster_width_px as f32 * 2.5).round() as u32;
        let height = (format.min_content_height_px() * 2.5).ceil() as u32;
        let geometry = PageGeometry::new(&format, width, height).unwrap();
        assert_eq!(geometry.page_count(), 1);
    }

    #[test]
    fn test_image_height() {
        let geometry = a4(1985, 6000);
        assert!((geometry.image_height_mm() - 6000.0 * 210.0 / 1985.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_empty_capture() {
        assert!(PageGeometry::new(&PageFormat::a4(), 0, 10).is_err());
        let mut format = PageFormat::a4();
        format.height_mm = 0.0;
        assert!(matches!(
            PageGeometry::new(&format, 10, 10),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_full_pages_plus_remainder(
            width in 200u32..2500,
            k in 0usize..6,
            fraction in 0.0f64..0.99,
        ) {
            let page_height = width as f64 / 210.0 * 297.0;
            // First whole row past k full pages up to the row before k + 1
            let first = (k as f64 * page_height).floor() + 1.0;
            let last = ((k + 1) as f64 * page_height).ceil() - 1.0;
            let height = (first + fraction * (last - first)).round() as u32;
            let geometry = a4(width, height);

            prop_assert_eq!(geometry.page_count(), k + 1);
            let last = geometry.slices()[k];
            prop_assert!((last.height_px - (height as f64 - k as f64 * page_height)).abs() < 1e-6);
        }

        #[test]
        fn prop_slices_are_contiguous(width in 100u32..3000, height in 1u32..20_000) {
            let geometry = a4(width, height);
            let slices = geometry.slices();
            prop_assert_eq!(slices.len(), geometry.page_count());
            prop_assert_eq!(slices[0].offset_px, 0.0);
            for pair in slices.windows(2) {
                prop_assert!((pair[0].offset_px + pair[0].height_px - pair[1].offset_px).abs() < 1e-6);
                prop_assert!((pair[0].height_px - geometry.page_height_px()).abs() < 1e-6);
            }
            let last = slices[slices.len() - 1];
            prop_assert!(last.height_px > 0.0);
            prop_assert!(last.height_px <= geometry.page_height_px() + 1e-6);
        }

        #[test]
        fn prop_scale_does_not_change_page_count(css_height in 1.0f64..8000.0, scale in 1.0f64..4.0) {
            let native = a4(794, css_height.ceil() as u32);
            let scaled = a4((794.0 * scale).round() as u32, (css_height * scale).ceil() as u32);
            // Rounding to whole device pixels can move a boundary by under a CSS pixel
            let native_pages = native.page_count() as i64;
            let scaled_pages = scaled.page_count() as i64;
            prop_assert!((native_pages - scaled_pages).abs() <= 1);
        }
    }
}
