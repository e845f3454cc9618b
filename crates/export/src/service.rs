//! Background export
//!
//! The tree is snapshotted on the caller's task; normalization, capture and
//! assembly run on the blocking pool so an async caller stays responsive.
//! Dropping the returned future cancels the background work, so a caller
//! applying its own timeout never gets a file written after giving up.

use crate::cancel::CancelOnDrop;
use crate::{CancelFlag, ExportError, ExportReport, PaginatedExporter, Result};
use raster::Rasterizer;
use render_model::LiveDocument;
use std::path::PathBuf;
use std::sync::Arc;
use store::pdf::PageAssembler;
use tracing::debug;

/// Runs exports off the async runtime's worker threads
pub struct ExportService<R, A> {
    exporter: Arc<PaginatedExporter<R, A>>,
}

impl<R, A> Clone for ExportService<R, A> {
    fn clone(&self) -> Self {
        Self {
            exporter: Arc::clone(&self.exporter),
        }
    }
}

impl<R, A> ExportService<R, A>
where
    R: Rasterizer + Send + Sync + 'static,
    A: PageAssembler + Send + Sync + 'static,
{
    pub fn new(exporter: PaginatedExporter<R, A>) -> Self {
        Self {
            exporter: Arc::new(exporter),
        }
    }

    pub fn exporter(&self) -> &PaginatedExporter<R, A> {
        &self.exporter
    }

    /// Export the document as it is now to `path`
    ///
    /// The export slot stays claimed until the background work finishes,
    /// even if this future is dropped first.
    pub async fn export(&self, document: &LiveDocument, path: impl Into<PathBuf>) -> Result<ExportReport> {
        self.export_cancellable(document, path, CancelFlag::new()).await
    }

    /// Export to `path`, giving up once `cancel` is set or this future is dropped
    pub async fn export_cancellable(
        &self,
        document: &LiveDocument,
        path: impl Into<PathBuf>,
        cancel: CancelFlag,
    ) -> Result<ExportReport> {
        let ticket = document
            .try_begin_export()
            .ok_or(ExportError::AlreadyExporting)?;
        let root = document.snapshot();
        let format = *document.format();
        let staging = document.staging().clone();
        let exporter = Arc::clone(&self.exporter);
        let path = path.into();

        debug!(path = %path.display(), "export scheduled");
        let on_drop = CancelOnDrop::new(cancel.clone());
        let result = tokio::task::spawn_blocking(move || {
            let _ticket = ticket;
            exporter.export_snapshot_until(&root, &format, &staging, &path, &cancel)
        })
        .await
        .map_err(|e| ExportError::Cancelled(e.to_string()))?;
        on_drop.disarm();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster::{CaptureResult, RasterOptions};
    use render_model::{ContentNode, PageFormat};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;
    use store::pdf::{PdfAssembler, PdfExportOptions};

    /// Blocks inside capture until released
    struct Gate {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Rasterizer for Gate {
        fn rasterize(&self, _: &ContentNode, options: &RasterOptions) -> raster::Result<CaptureResult> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            let width = options.width_px;
            Ok(CaptureResult {
                width,
                height: 10,
                scale: 1.0,
                pixels: vec![255; (width * 10 * 3) as usize],
            })
        }
    }

    struct Solid;

    impl Rasterizer for Solid {
        fn rasterize(&self, _: &ContentNode, options: &RasterOptions) -> raster::Result<CaptureResult> {
            let width = options.width_px;
            Ok(CaptureResult {
                width,
                height: 2000,
                scale: 1.0,
                pixels: vec![0; (width * 2000 * 3) as usize],
            })
        }
    }

    fn assembler() -> PdfAssembler {
        PdfAssembler::new(PdfExportOptions::new().without_creation_date())
    }

    #[tokio::test]
    async fn test_background_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.pdf");
        let document = LiveDocument::new(ContentNode::column(), PageFormat::a4());
        let service = ExportService::new(PaginatedExporter::new(Solid, assembler()).with_scale(1.0));

        let report = service.export(&document, &path).await.unwrap();
        assert_eq!(report.page_count, 2);
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        assert!(!document.is_exporting());
        assert_eq!(document.staging().staging_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_export_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gate = Gate {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let service = ExportService::new(PaginatedExporter::new(gate, assembler()).with_scale(1.0));
        let document = Arc::new(LiveDocument::new(ContentNode::column(), PageFormat::a4()));

        let first = {
            let service = service.clone();
            let document = Arc::clone(&document);
            let path = dir.path().join("first.pdf");
            tokio::spawn(async move { service.export(&document, path).await })
        };
        tokio::task::spawn_blocking(move || entered_rx.recv().unwrap())
            .await
            .unwrap();

        let second = service.export(&document, dir.path().join("second.pdf")).await;
        assert!(matches!(second, Err(ExportError::AlreadyExporting)));

        release_tx.send(()).unwrap();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.page_count, 1);
        assert!(!document.is_exporting());
    }

    async fn wait_until_idle(document: &LiveDocument) {
        for _ in 0..500 {
            if !document.is_exporting() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("export never finished");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_export_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.pdf");
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gate = Gate {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let service = ExportService::new(PaginatedExporter::new(gate, assembler()).with_scale(1.0));
        let document = LiveDocument::new(ContentNode::column(), PageFormat::a4());

        let timed_out = tokio::time::timeout(Duration::from_millis(50), service.export(&document, &path)).await;
        assert!(timed_out.is_err());

        // Let the capture finish after the caller gave up
        release_tx.send(()).unwrap();
        wait_until_idle(&document).await;
        drop(entered_rx);

        assert!(!path.exists());
        assert_eq!(document.staging().staging_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_flag_stops_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.pdf");
        let document = LiveDocument::new(ContentNode::column(), PageFormat::a4());
        let service = ExportService::new(PaginatedExporter::new(Solid, assembler()).with_scale(1.0));

        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = service
            .export_cancellable(&document, &path, cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Cancelled(_)));
        assert!(!path.exists());
        assert!(!document.is_exporting());

        // A fresh flag exports normally
        service.export(&document, &path).await.unwrap();
        assert!(path.exists());
    }
}
