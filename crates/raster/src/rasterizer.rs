//! SVG-backed rasterizer

use crate::svg::to_svg;
use crate::{CaptureResult, RasterError, RasterOptions, Rasterizer, Result};
use render_model::{layout, Color, ContentNode};
use resvg::tiny_skia::{self, Pixmap, Transform};
use resvg::usvg;
use std::sync::Arc;
use tracing::debug;

/// Largest capture area, in device pixels (1 GiB of RGBA)
///
/// Height alone is not limited; a long letter only fails once its pixels
/// no longer fit this memory budget.
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// Rasterizes by painting the laid-out tree as SVG and rendering it with resvg
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgRasterizer {
    /// Create a rasterizer using the system fonts
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        debug!(faces = fontdb.len(), "loaded system fonts");
        Self::with_fonts(fontdb)
    }

    /// Create a rasterizer with an explicit font database
    pub fn with_fonts(fontdb: usvg::fontdb::Database) -> Self {
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    fn options(&self) -> usvg::Options<'static> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        options
    }
}

/// Device size of a capture of `width` x `height` CSS pixels
pub fn surface_size(width: f32, height: f32, scale: f32) -> Result<(u32, u32)> {
    let device_width = (width * scale).round();
    let device_height = (height * scale).ceil();
    if !device_width.is_finite() || !device_height.is_finite() || device_width < 1.0 || device_height < 1.0 {
        return Err(RasterError::Unmeasurable(format!(
            "{}x{} at scale {}",
            width, height, scale
        )));
    }

    let (w, h) = (device_width as u64, device_height as u64);
    if w.saturating_mul(h) > MAX_SURFACE_AREA {
        return Err(RasterError::SurfaceTooLarge { width: w, height: h });
    }
    Ok((w as u32, h as u32))
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, root: &ContentNode, options: &RasterOptions) -> Result<CaptureResult> {
        if !options.scale.is_finite() || options.scale <= 0.0 {
            return Err(RasterError::Unmeasurable(format!("invalid scale {}", options.scale)));
        }

        let layout = layout(root, options.width_px as f32)
            .map_err(|e| RasterError::Unmeasurable(e.to_string()))?;
        if let Some(url) = layout.remote_images().next() {
            return Err(RasterError::UnresolvedImage(url.to_string()));
        }

        let (width, height) = surface_size(layout.width, layout.height, options.scale)?;
        debug!(
            css_width = layout.width,
            css_height = layout.height,
            width,
            height,
            scale = options.scale,
            "rasterizing"
        );

        let svg = to_svg(&layout);
        let tree = usvg::Tree::from_str(&svg, &self.options()).map_err(|e| RasterError::Svg(e.to_string()))?;

        let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::SurfaceTooLarge {
            width: width as u64,
            height: height as u64,
        })?;
        let backdrop = options.background.flatten_onto(Color::WHITE);
        pixmap.fill(tiny_skia::Color::from_rgba8(backdrop.r, backdrop.g, backdrop.b, 255));
        resvg::render(
            &tree,
            Transform::from_scale(options.scale, options.scale),
            &mut pixmap.as_mut(),
        );

        // The backdrop is opaque, so premultiplied and straight RGB agree
        let pixels = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        Ok(CaptureResult {
            width,
            height,
            scale: options.scale,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_model::ImageSource;

    fn rasterizer() -> SvgRasterizer {
        SvgRasterizer::with_fonts(usvg::fontdb::Database::new())
    }

    fn block(height: f32, color: Color) -> ContentNode {
        ContentNode::column().styled(|s| {
            s.height = Some(height);
            s.background = Some(color);
        })
    }

    #[test]
    fn test_capture_size_follows_scale() {
        let root = block(1000.0, Color::WHITE);
        let capture = rasterizer()
            .rasterize(&root, &RasterOptions::new(794, 2.5))
            .unwrap();
        assert_eq!(capture.width, 1985);
        assert_eq!(capture.height, 2500);
        assert_eq!(capture.pixels.len(), 1985 * 2500 * 3);
        assert_eq!(capture.css_height(), 1000.0);
    }

    #[test]
    fn test_paints_background_and_fills() {
        let root = ContentNode::column()
            .child(block(10.0, Color::rgb(255, 0, 0)))
            .child(block(10.0, Color::TRANSPARENT));
        let options = RasterOptions::new(20, 1.0).with_background(Color::rgb(0, 0, 255));
        let capture = rasterizer().rasterize(&root, &options).unwrap();
        assert_eq!(capture.pixel(5, 5), Some([255, 0, 0]));
        assert_eq!(capture.pixel(5, 15), Some([0, 0, 255]));
    }

    #[test]
    fn test_translucent_background_flattened() {
        let root = block(4.0, Color::TRANSPARENT);
        let options = RasterOptions::new(4, 1.0).with_background(Color::TRANSPARENT);
        let capture = rasterizer().rasterize(&root, &options).unwrap();
        assert_eq!(capture.pixel(0, 0), Some([255, 255, 255]));
    }

    #[test]
    fn test_scale_transform_is_honored() {
        let root = block(1000.0, Color::WHITE).styled(|s| s.transform_scale = Some(0.5));
        let capture = rasterizer().rasterize(&root, &RasterOptions::new(794, 1.0)).unwrap();
        assert_eq!(capture.width, 397);
        assert_eq!(capture.height, 500);
    }

    #[test]
    fn test_remote_image_is_unresolved() {
        let root = ContentNode::column().child(
            ContentNode::image(ImageSource::Remote("https://example.com/logo.png".into()))
                .styled(|s| s.height = Some(10.0)),
        );
        let err = rasterizer()
            .rasterize(&root, &RasterOptions::new(100, 1.0))
            .unwrap_err();
        assert!(matches!(err, RasterError::UnresolvedImage(_)));
    }

    #[test]
    fn test_empty_tree_is_unmeasurable() {
        let err = rasterizer()
            .rasterize(&ContentNode::column(), &RasterOptions::new(100, 1.0))
            .unwrap_err();
        assert!(matches!(err, RasterError::Unmeasurable(_)));
    }

    #[test]
    fn test_surface_limits() {
        // Tall captures are fine as long as the area fits
        assert_eq!(surface_size(794.0, 14_000.0, 2.5).unwrap(), (1985, 35_000));
        assert_eq!(surface_size(794.0, 40_000.0, 1.0).unwrap(), (794, 40_000));
        assert!(matches!(
            surface_size(794.0, 200_000.0, 2.5),
            Err(RasterError::SurfaceTooLarge { .. })
        ));
        assert!(matches!(
            surface_size(f32::MAX, f32::MAX, 1.0),
            Err(RasterError::SurfaceTooLarge { .. })
        ));
        assert!(matches!(
            surface_size(794.0, f32::INFINITY, 1.0),
            Err(RasterError::Unmeasurable(_))
        ));
        assert_eq!(surface_size(794.0, 2400.0, 2.5).unwrap(), (1985, 6000));
    }

    #[test]
    fn test_capture_taller_than_canvas_edge_limits() {
        let root = block(14_000.0, Color::rgb(255, 0, 0));
        let capture = rasterizer().rasterize(&root, &RasterOptions::new(8, 2.5)).unwrap();
        assert_eq!((capture.width, capture.height), (20, 35_000));
        assert_eq!(capture.pixel(10, 34_999), Some([255, 0, 0]));
    }

    #[test]
    fn test_embedded_image_renders() {
        let mut png = Vec::new();
        image::RgbImage::from_pixel(2, 2, image::Rgb([0, 255, 0]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let source = ImageSource::embedded("image/png", png).unwrap();
        let root = ContentNode::column().child(ContentNode::image(source).styled(|s| s.height = Some(20.0)));
        let capture = rasterizer().rasterize(&root, &RasterOptions::new(20, 1.0)).unwrap();
        assert_eq!(capture.pixel(10, 10), Some([0, 255, 0]));
    }
}
