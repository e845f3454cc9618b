//! Paginated export: clone, measure, slice
//!
//! One capture of the whole letter is taken at native scale and
//! supersampled. Every page draws that same image shifted up by one page
//! height per page index and clipped to the page, so content is never
//! re-laid-out per page and lines may be cut at page boundaries.

use crate::{normalize, CancelFlag, ExportError, PageGeometry, Result};
use raster::{RasterOptions, Rasterizer};
use render_model::{Color, ContentNode, LiveDocument, PageFormat, StagingRegistry};
use std::path::Path;
use std::time::Instant;
use store::pdf::{ImageData, PageAssembler, PageDocument, PdfError};
use store::ExportSettings;
use tracing::{debug, error, info};

/// Device pixels per CSS pixel when nothing else is configured
pub const DEFAULT_SUPERSAMPLE_SCALE: f32 = store::DEFAULT_SUPERSAMPLE_SCALE;

/// What an export produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub page_count: usize,
    /// Capture size in device pixels
    pub capture_width: u32,
    pub capture_height: u32,
    /// One page's height in capture pixels
    pub page_height_px: f64,
    /// Height of the last page's slice in capture pixels
    pub last_slice_height_px: f64,
}

/// Exports content trees as paginated documents
///
/// Generic over how a tree is rasterized and how pages are assembled.
#[derive(Debug, Clone)]
pub struct PaginatedExporter<R, A> {
    rasterizer: R,
    assembler: A,
    format: PageFormat,
    scale: f32,
    background: Color,
}

impl<R: Rasterizer, A: PageAssembler> PaginatedExporter<R, A> {
    /// A4, 2.5x supersampling, white background
    pub fn new(rasterizer: R, assembler: A) -> Self {
        Self {
            rasterizer,
            assembler,
            format: PageFormat::a4(),
            scale: DEFAULT_SUPERSAMPLE_SCALE,
            background: Color::WHITE,
        }
    }

    /// Page format used by [`export_node`](Self::export_node)
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Page background; translucent colors are flattened onto white
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Apply format, scale and background from saved settings
    pub fn with_settings(self, settings: &ExportSettings) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| ExportError::InvalidFormat(e.to_string()))?;
        let background = settings
            .background_color()
            .map_err(|e| ExportError::InvalidFormat(e.to_string()))?;
        Ok(self
            .with_format(settings.format())
            .with_scale(settings.supersample_scale)
            .with_background(background))
    }

    pub fn format(&self) -> &PageFormat {
        &self.format
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn assembler(&self) -> &A {
        &self.assembler
    }

    /// Export the live document to `path` in its own page format
    ///
    /// Fails with [`ExportError::AlreadyExporting`] while another export of
    /// the same document is running.
    pub fn export(&self, document: &LiveDocument, path: &Path) -> Result<ExportReport> {
        let _ticket = document
            .try_begin_export()
            .ok_or(ExportError::AlreadyExporting)?;
        self.export_snapshot(document.root(), document.format(), document.staging(), path)
    }

    /// Export the live document into memory
    pub fn export_to_bytes(&self, document: &LiveDocument) -> Result<Vec<u8>> {
        let _ticket = document
            .try_begin_export()
            .ok_or(ExportError::AlreadyExporting)?;
        let (assembled, _) = self
            .assemble(document.root(), document.format(), document.staging())
            .inspect_err(|e| error!(error = %e, "export failed"))?;
        Ok(assembled.to_bytes().inspect_err(|e| error!(error = %e, "export failed"))?)
    }

    /// Export a detached tree to `path` in the exporter's page format
    pub fn export_node(&self, root: &ContentNode, path: &Path) -> Result<ExportReport> {
        self.export_snapshot(root, &self.format, &StagingRegistry::new(), path)
    }

    /// Export `root`, registering its staging copy with `staging`
    ///
    /// Callers that own a [`LiveDocument`] should hold its export ticket.
    pub fn export_snapshot(
        &self,
        root: &ContentNode,
        format: &PageFormat,
        staging: &StagingRegistry,
        path: &Path,
    ) -> Result<ExportReport> {
        self.export_snapshot_until(root, format, staging, path, &CancelFlag::new())
    }

    /// Like [`export_snapshot`](Self::export_snapshot), stopping at the next
    /// phase boundary once `cancel` is set
    ///
    /// The flag is checked last just before the file is written.
    pub fn export_snapshot_until(
        &self,
        root: &ContentNode,
        format: &PageFormat,
        staging: &StagingRegistry,
        path: &Path,
        cancel: &CancelFlag,
    ) -> Result<ExportReport> {
        let result = self
            .assemble_until(root, format, staging, cancel)
            .and_then(|(assembled, report)| {
                let bytes = assembled.to_bytes()?;
                cancel.check()?;
                store::write_atomic(path, &bytes).map_err(PdfError::from)?;
                Ok(report)
            });
        match &result {
            Ok(report) => info!(
                path = %path.display(),
                page_count = report.page_count,
                "exported letter"
            ),
            Err(e) => error!(path = %path.display(), error = %e, "export failed"),
        }
        result
    }

    /// Normalize, rasterize once and lay the capture out across pages
    ///
    /// The staging copy stays registered until this returns, on every path.
    pub fn assemble(
        &self,
        root: &ContentNode,
        format: &PageFormat,
        staging: &StagingRegistry,
    ) -> Result<(A::Document, ExportReport)> {
        self.assemble_until(root, format, staging, &CancelFlag::new())
    }

    fn assemble_until(
        &self,
        root: &ContentNode,
        format: &PageFormat,
        staging: &StagingRegistry,
        cancel: &CancelFlag,
    ) -> Result<(A::Document, ExportReport)> {
        format
            .validate()
            .map_err(|e| ExportError::InvalidFormat(e.to_string()))?;
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ExportError::InvalidFormat(format!(
                "supersampling factor {} is not positive",
                self.scale
            )));
        }

        cancel.check()?;
        let started = Instant::now();
        let copy = staging.attach(normalize(root, format, self.background));
        debug!(
            width_px = format.raster_width_px,
            min_height_px = format.min_content_height_px(),
            "staged normalized copy"
        );

        let options = RasterOptions::new(format.raster_width_px, self.scale)
            .with_background(self.background);
        let capture = self.rasterizer.rasterize(copy.node(), &options)?;
        debug!(
            capture_width = capture.width,
            capture_height = capture.height,
            scale = self.scale,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "captured"
        );
        cancel.check()?;

        let geometry = PageGeometry::new(format, capture.width, capture.height)?;
        let slices = geometry.slices();
        let image_height_mm = geometry.image_height_mm() as f32;
        debug!(
            page_count = slices.len(),
            page_height_px = geometry.page_height_px(),
            image_height_mm,
            "paginated"
        );

        let mut document = self.assembler.new_document(format)?;
        let image = document.add_image(ImageData::from_raw_rgb(
            capture.pixels,
            capture.width,
            capture.height,
        )?)?;
        for slice in &slices {
            if slice.index > 0 {
                document.add_page();
            }
            document.place_image(&image, 0.0, slice.y_mm as f32, format.width_mm, image_height_mm)?;
        }

        let report = ExportReport {
            page_count: slices.len(),
            capture_width: geometry.capture_width,
            capture_height: geometry.capture_height,
            page_height_px: geometry.page_height_px(),
            last_slice_height_px: slices.last().map_or(0.0, |s| s.height_px),
        };
        drop(copy);
        Ok((document, report))
    }
}
