//! Capture types and the rasterizer seam

use crate::Result;
use render_model::{Color, ContentNode};

/// How a tree is rasterized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Layout width in CSS pixels
    pub width_px: u32,
    /// Device pixels per CSS pixel
    pub scale: f32,
    /// Backdrop painted under the content
    pub background: Color,
}

impl RasterOptions {
    pub fn new(width_px: u32, scale: f32) -> Self {
        Self {
            width_px,
            scale,
            background: Color::WHITE,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

/// One raster of an entire tree at its full natural height
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureResult {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
    /// Device pixels per CSS pixel the capture was taken at
    pub scale: f32,
    /// Packed RGB, row-major, `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

impl CaptureResult {
    /// Height in CSS pixels
    pub fn css_height(&self) -> f32 {
        self.height as f32 / self.scale
    }

    /// RGB of the pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// One row of packed RGB
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * 3;
        let start = y as usize * stride;
        Some(&self.pixels[start..start + stride])
    }
}

/// Turns a content tree into a single capture
pub trait Rasterizer {
    fn rasterize(&self, root: &ContentNode, options: &RasterOptions) -> Result<CaptureResult>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(&self, root: &ContentNode, options: &RasterOptions) -> Result<CaptureResult> {
        (**self).rasterize(root, options)
    }
}
