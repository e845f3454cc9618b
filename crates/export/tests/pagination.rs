//! End-to-end pagination through the real rasterizer

use export::{ExportError, PaginatedExporter};
use raster::{CaptureResult, RasterOptions, Rasterizer, SvgRasterizer};
use render_model::{
    compose_letter, Color, ContentNode, ImageSource, LiveDocument, PageFormat, PreviewZoom,
};
use resvg::usvg;
use std::sync::Mutex;
use store::pdf::{
    ImageData, ImageHandle, PageAssembler, PageDocument, PdfAssembler, PdfError, PdfExportOptions,
};

fn rasterizer() -> SvgRasterizer {
    SvgRasterizer::with_fonts(usvg::fontdb::Database::new())
}

fn pdf() -> PdfAssembler {
    PdfAssembler::new(PdfExportOptions::new().without_creation_date())
}

/// Striped content of the given total height, so slices differ visibly
fn striped(height: f32) -> ContentNode {
    let colors = [Color::SLATE_900, Color::rgb(0x0e, 0xa5, 0xe9), Color::SLATE_200];
    let stripes = (height / 100.0).ceil() as usize;
    let mut root = ContentNode::column();
    for i in 0..stripes {
        let stripe_height = (height - i as f32 * 100.0).min(100.0);
        root = root.child(ContentNode::column().styled(|s| {
            s.height = Some(stripe_height);
            s.background = Some(colors[i % colors.len()]);
        }));
    }
    root
}

/// Keeps every capture it produces
struct Recording<R> {
    inner: R,
    captures: Mutex<Vec<CaptureResult>>,
}

impl<R> Recording<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            captures: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> CaptureResult {
        self.captures.lock().unwrap().last().cloned().unwrap()
    }
}

impl<R: Rasterizer> Rasterizer for Recording<R> {
    fn rasterize(&self, root: &ContentNode, options: &RasterOptions) -> raster::Result<CaptureResult> {
        let capture = self.inner.rasterize(root, options)?;
        self.captures.lock().unwrap().push(capture.clone());
        Ok(capture)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Placed {
    image: String,
    x_mm: f32,
    y_mm: f32,
    width_mm: f32,
    height_mm: f32,
}

/// Records pages and placements instead of writing a file
#[derive(Debug, Default)]
struct RecordingAssembler;

#[derive(Debug)]
struct RecordedDocument {
    format: PageFormat,
    images: Vec<(u32, u32)>,
    pages: Vec<Vec<Placed>>,
}

impl PageAssembler for RecordingAssembler {
    type Document = RecordedDocument;

    fn new_document(&self, format: &PageFormat) -> store::pdf::Result<RecordedDocument> {
        Ok(RecordedDocument {
            format: *format,
            images: Vec::new(),
            pages: vec![Vec::new()],
        })
    }
}

impl PageDocument for RecordedDocument {
    fn format(&self) -> &PageFormat {
        &self.format
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn add_image(&mut self, image: ImageData) -> store::pdf::Result<ImageHandle> {
        self.images.push((image.width, image.height));
        Ok(ImageHandle::new(self.images.len() - 1, image.width, image.height))
    }

    fn place_image(
        &mut self,
        image: &ImageHandle,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    ) -> store::pdf::Result<()> {
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| PdfError::InvalidDocument("no page".into()))?;
        page.push(Placed {
            image: image.name(),
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        });
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn to_bytes(&self) -> store::pdf::Result<Vec<u8>> {
        Ok(format!("{:?}", self.pages).into_bytes())
    }
}

#[test]
fn short_content_is_one_page() {
    let exporter = PaginatedExporter::new(rasterizer(), RecordingAssembler).with_scale(1.0);
    let (document, report) = exporter
        .assemble(&striped(300.0), &PageFormat::a4(), &Default::default())
        .unwrap();

    assert_eq!(report.page_count, 1);
    assert_eq!(document.page_count(), 1);
    // Forced one-page minimum
    assert_eq!(report.capture_height, 1122);
    let placed = &document.pages[0][0];
    assert_eq!((placed.x_mm, placed.y_mm, placed.width_mm), (0.0, 0.0, 210.0));
}

#[test]
fn tall_letter_scenario_at_default_scale() {
    let exporter = PaginatedExporter::new(rasterizer(), RecordingAssembler);
    let (document, report) = exporter
        .assemble(&striped(2400.0), &PageFormat::a4(), &Default::default())
        .unwrap();

    assert_eq!((report.capture_width, report.capture_height), (1985, 6000));
    assert_eq!(report.page_count, 3);
    let page_height_css = report.page_height_px / 2.5;
    assert!((page_height_css - 1122.97).abs() < 0.01);
    assert!((report.last_slice_height_px / 2.5 - 154.0).abs() < 1.0);

    // One image, the same placement shifted up a page at a time
    assert_eq!(document.images, vec![(1985, 6000)]);
    let expected_height = 6000.0 * 210.0 / 1985.0;
    for (i, page) in document.pages.iter().enumerate() {
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].image, "Im0");
        assert_eq!(page[0].y_mm, -(i as f32) * 297.0);
        assert!((page[0].height_mm - expected_height).abs() < 1e-3);
    }
}

#[test]
fn full_pages_plus_remainder() {
    let exporter = PaginatedExporter::new(rasterizer(), RecordingAssembler).with_scale(1.0);
    let page_height = PageFormat::a4().page_height_px() as f64;
    for (k, remainder) in [(1usize, 40.0f64), (2, 600.0), (3, 1000.0)] {
        let height = (k as f64 * page_height + remainder).round() as f32;
        let (_, report) = exporter
            .assemble(&striped(height), &PageFormat::a4(), &Default::default())
            .unwrap();
        assert_eq!(report.page_count, k + 1, "k = {}", k);
        assert!((report.last_slice_height_px - remainder).abs() < 1.0);
    }
}

#[test]
fn preview_zoom_does_not_change_output() {
    let exporter = PaginatedExporter::new(Recording::new(rasterizer()), RecordingAssembler).with_scale(1.0);
    let mut results = Vec::new();
    for zoom in [0.3, 0.85, 1.2] {
        let document = LiveDocument::new(striped(1800.0), PageFormat::a4()).with_zoom(PreviewZoom::new(zoom));
        let bytes = exporter.export_to_bytes(&document).unwrap();
        results.push((bytes, exporter.rasterizer().last()));
        // The live preview keeps its zoom
        assert_eq!(document.root().style.transform_scale, Some(zoom));
    }

    for (bytes, capture) in &results[1..] {
        assert_eq!(bytes, &results[0].0);
        assert_eq!(capture.width, results[0].1.width);
        assert_eq!(capture.height, results[0].1.height);
        assert!(capture.pixels == results[0].1.pixels);
    }
}

#[test]
fn repeated_exports_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = PaginatedExporter::new(rasterizer(), pdf()).with_scale(1.0);
    let document = LiveDocument::new(striped(2600.0), PageFormat::a4());

    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    let a = exporter.export(&document, &first).unwrap();
    let b = exporter.export(&document, &second).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.page_count, 3);
    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn staging_is_released_after_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = PaginatedExporter::new(rasterizer(), pdf()).with_scale(1.0);

    let document = LiveDocument::new(striped(500.0), PageFormat::a4());
    exporter.export(&document, &dir.path().join("ok.pdf")).unwrap();
    assert_eq!(document.staging().staging_count(), 0);
    assert!(!document.is_exporting());

    let remote = ContentNode::image(ImageSource::Remote("https://example.com/logo.png".into()))
        .styled(|s| s.height = Some(40.0));
    let document = LiveDocument::new(ContentNode::column().child(remote), PageFormat::a4());
    let err = exporter
        .export(&document, &dir.path().join("failed.pdf"))
        .unwrap_err();
    assert!(matches!(err, ExportError::Capture(raster::RasterError::UnresolvedImage(_))));
    assert_eq!(document.staging().staging_count(), 0);
    assert!(!document.is_exporting());
    assert!(!dir.path().join("failed.pdf").exists());
}

#[test]
fn failed_export_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letter.pdf");
    std::fs::write(&path, b"previous").unwrap();

    let exporter = PaginatedExporter::new(rasterizer(), pdf()).with_scale(1.0);
    let remote = ContentNode::image(ImageSource::Remote("https://example.com/a.png".into()))
        .styled(|s| s.height = Some(10.0));
    assert!(exporter
        .export_node(&ContentNode::column().child(remote), &path)
        .is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}

#[test]
fn missing_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("letter.pdf");
    let exporter = PaginatedExporter::new(rasterizer(), pdf()).with_scale(1.0);
    let err = exporter.export_node(&striped(200.0), &path).unwrap_err();
    assert!(matches!(err, ExportError::Assembly(PdfError::Io(_))));
    assert!(!path.exists());
}

#[test]
fn composed_letter_exports_to_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letter.pdf");
    let format = PageFormat::a4();
    let mut content = doc_model::LetterContent::default();
    content.body = "<p>Paragraph</p>".repeat(60);
    let root = compose_letter(&doc_model::CompanyProfile::default(), &content, &format).unwrap();

    let document = LiveDocument::new(root, format).with_zoom(PreviewZoom::new(0.85));
    assert!(document.root().has_screen_only());
    let preview_pages = document.preview_page_count().unwrap();

    let exporter = PaginatedExporter::new(rasterizer(), pdf()).with_scale(1.0);
    let report = exporter.export(&document, &path).unwrap();

    assert_eq!(report.page_count, preview_pages);
    assert!(report.page_count >= 2);
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(&format!("/Count {}", report.page_count)));
}

#[test]
fn long_letter_exports_every_page() {
    // Narrow page keeps a capture over 32767 device px tall cheap to render
    let format = PageFormat {
        width_mm: 21.0,
        height_mm: 29.7,
        raster_width_px: 80,
        dpi: 96.0,
    };
    let exporter = PaginatedExporter::new(rasterizer(), RecordingAssembler);
    let (document, report) = exporter
        .assemble(&striped(14_000.0), &format, &Default::default())
        .unwrap();

    assert_eq!((report.capture_width, report.capture_height), (200, 35_000));
    let page_height = 200.0 / 21.0 * 29.7;
    assert!((report.page_height_px - page_height).abs() < 1e-3);
    assert_eq!(report.page_count, (35_000.0 / page_height).ceil() as usize);
    assert!(report.page_count > 12);
    assert_eq!(document.pages.len(), report.page_count);
    let last = document.pages.last().unwrap();
    assert!((last[0].y_mm + (report.page_count - 1) as f32 * 29.7).abs() < 1e-2);
}

#[test]
fn one_row_past_a_page_adds_a_page() {
    let exporter = PaginatedExporter::new(rasterizer(), RecordingAssembler).with_scale(1.0);
    let (document, report) = exporter
        .assemble(&striped(1123.0), &PageFormat::a4(), &Default::default())
        .unwrap();
    assert_eq!(report.capture_height, 1123);
    assert_eq!(report.page_count, 2);
    assert_eq!(document.pages.len(), 2);
}
