//! Page assembly
//!
//! A [`PageAssembler`] opens documents of a fixed page format; a
//! [`PageDocument`] collects pages and image placements and serializes them.
//! Placements are given in millimetres from the page's top-left corner.

use super::content::ContentStream;
use super::document::{create_catalog, create_page, create_pages, mm_to_pt, MediaBox};
use super::images::ImageData;
use super::objects::{PdfDictionary, PdfStream};
use super::options::PdfExportOptions;
use super::writer::{PdfError, PdfWriter, Result};
use render_model::PageFormat;
use std::path::Path;
use tracing::debug;

/// Reference to an image added to a document
///
/// Only valid for the document that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    index: usize,
    width_px: u32,
    height_px: u32,
}

impl ImageHandle {
    /// Handle for the `index`th image a document registered
    pub fn new(index: usize, width_px: u32, height_px: u32) -> Self {
        Self {
            index,
            width_px,
            height_px,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Resource name the image is painted under
    pub fn name(&self) -> String {
        format!("Im{}", self.index)
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }
}

/// A document under construction
///
/// A fresh document already has one page; [`add_page`](Self::add_page)
/// appends another and makes it current.
pub trait PageDocument {
    fn format(&self) -> &PageFormat;

    /// Append a page and make it the target of later placements
    fn add_page(&mut self);

    /// Register image data once; placements reference it by handle
    fn add_image(&mut self, image: ImageData) -> Result<ImageHandle>;

    /// Draw an image on the current page, clipped to the page bounds
    fn place_image(
        &mut self,
        image: &ImageHandle,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    ) -> Result<()>;

    fn page_count(&self) -> usize;

    /// Serialize the finished document
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Serialize to `path`, never leaving a partial file behind
    fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        crate::write_atomic(path, &bytes)?;
        Ok(())
    }
}

/// Opens documents
pub trait PageAssembler {
    type Document: PageDocument;

    fn new_document(&self, format: &PageFormat) -> Result<Self::Document>;
}

impl<A: PageAssembler + ?Sized> PageAssembler for &A {
    type Document = A::Document;

    fn new_document(&self, format: &PageFormat) -> Result<Self::Document> {
        (**self).new_document(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    image: usize,
    x_mm: f64,
    y_mm: f64,
    width_mm: f64,
    height_mm: f64,
}

/// Assembles PDF documents
#[derive(Debug, Clone, Default)]
pub struct PdfAssembler {
    options: PdfExportOptions,
}

impl PdfAssembler {
    pub fn new(options: PdfExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PdfExportOptions {
        &self.options
    }
}

impl PageAssembler for PdfAssembler {
    type Document = PdfPageDocument;

    fn new_document(&self, format: &PageFormat) -> Result<PdfPageDocument> {
        format
            .validate()
            .map_err(|e| PdfError::InvalidDocument(e.to_string()))?;
        Ok(PdfPageDocument {
            format: *format,
            options: self.options.clone(),
            images: Vec::new(),
            pages: vec![Vec::new()],
        })
    }
}

/// In-memory PDF document
#[derive(Debug, Clone)]
pub struct PdfPageDocument {
    format: PageFormat,
    options: PdfExportOptions,
    images: Vec<ImageData>,
    pages: Vec<Vec<Placement>>,
}

impl PdfPageDocument {
    /// Number of distinct embedded images
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    fn page_content(&self, placements: &[Placement], media: MediaBox) -> ContentStream {
        let mut content = ContentStream::new();
        content
            .save_state()
            .rect(0.0, 0.0, media.width, media.height)
            .clip()
            .end_path();
        for placement in placements {
            let width = mm_to_pt(placement.width_mm);
            let height = mm_to_pt(placement.height_mm);
            let x = mm_to_pt(placement.x_mm);
            // Top-left millimetres to a bottom-left origin
            let y = media.height - mm_to_pt(placement.y_mm) - height;
            content.paint_image(&format!("Im{}", placement.image), x, y, width, height);
        }
        content.restore_state();
        content
    }
}

impl PageDocument for PdfPageDocument {
    fn format(&self) -> &PageFormat {
        &self.format
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn add_image(&mut self, mut image: ImageData) -> Result<ImageHandle> {
        if self.options.compress {
            image.compress()?;
        }
        let handle = ImageHandle::new(self.images.len(), image.width, image.height);
        self.images.push(image);
        Ok(handle)
    }

    fn place_image(
        &mut self,
        image: &ImageHandle,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    ) -> Result<()> {
        let known = self
            .images
            .get(image.index)
            .is_some_and(|data| data.width == image.width_px && data.height == image.height_px);
        if !known {
            return Err(PdfError::InvalidDocument(format!(
                "image {} does not belong to this document",
                image.name()
            )));
        }
        if ![x_mm, y_mm, width_mm, height_mm].iter().all(|v| v.is_finite())
            || width_mm <= 0.0
            || height_mm <= 0.0
        {
            return Err(PdfError::InvalidDocument(format!(
                "bad placement {} {} {}x{} mm",
                x_mm, y_mm, width_mm, height_mm
            )));
        }

        let placement = Placement {
            image: image.index,
            x_mm: x_mm as f64,
            y_mm: y_mm as f64,
            width_mm: width_mm as f64,
            height_mm: height_mm as f64,
        };
        match self.pages.last_mut() {
            Some(page) => page.push(placement),
            None => self.pages.push(vec![placement]),
        }
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let media = MediaBox::from_format(&self.format);
        let mut writer = PdfWriter::new(Vec::new(), self.options.pdf_version);
        writer.set_compression(self.options.compress);
        writer.write_header()?;

        let catalog_id = writer.allocate();
        let pages_id = writer.allocate();

        let mut image_ids = Vec::with_capacity(self.images.len());
        for image in &self.images {
            let id = writer.allocate();
            writer.write_stream(id, image.to_xobject())?;
            image_ids.push(id);
        }

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for placements in &self.pages {
            let content_id = writer.allocate();
            let content = self.page_content(placements, media);
            writer.write_stream(
                content_id,
                PdfStream::new(PdfDictionary::new(), content.into_bytes()),
            )?;

            let mut used: Vec<usize> = placements.iter().map(|p| p.image).collect();
            used.sort_unstable();
            used.dedup();
            let resources: Vec<(String, u32)> = used
                .into_iter()
                .map(|i| (format!("Im{}", i), image_ids[i]))
                .collect();

            let page_id = writer.allocate();
            writer.write_object(page_id, &create_page(pages_id, content_id, &resources).into())?;
            page_ids.push(page_id);
        }

        writer.write_object(pages_id, &create_pages(&page_ids, media).into())?;
        writer.write_object(catalog_id, &create_catalog(pages_id).into())?;

        let info = self.options.document_info().to_dictionary();
        let info_id = if info.is_empty() {
            None
        } else {
            let id = writer.allocate();
            writer.write_object(id, &info.into())?;
            Some(id)
        };

        let bytes = writer.finish(catalog_id, info_id)?;
        debug!(
            pages = self.pages.len(),
            images = self.images.len(),
            bytes = bytes.len(),
            "assembled pdf"
        );
        Ok(bytes)
    }
}
