//! The live document shown in the editor
//!
//! Owns the content tree being previewed, the preview zoom, the registry of
//! off-screen staging copies and the in-flight export flag.

use crate::{layout, ContentNode, PageFormat, PreviewZoom, Result};
use doc_model::NodeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Identifier of a mounted staging copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountId(NodeId);

/// Registry of staging copies currently attached to a document
///
/// Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct StagingRegistry {
    mounted: Arc<Mutex<HashMap<MountId, NodeId>>>,
}

impl StagingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a staging copy; it stays registered until the guard drops
    pub fn attach(&self, node: ContentNode) -> StagingCopy {
        let id = MountId(NodeId::new());
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, node.id);
        tracing::trace!(source = %node.id, "staging copy attached");
        StagingCopy {
            id,
            node,
            registry: self.clone(),
        }
    }

    /// Number of copies still attached
    pub fn staging_count(&self) -> usize {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn detach(&self, id: MountId) {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// A staging copy attached to a registry; detaches on drop
#[derive(Debug)]
pub struct StagingCopy {
    id: MountId,
    node: ContentNode,
    registry: StagingRegistry,
}

impl StagingCopy {
    pub fn mount_id(&self) -> MountId {
        self.id
    }

    pub fn node(&self) -> &ContentNode {
        &self.node
    }
}

impl Drop for StagingCopy {
    fn drop(&mut self) {
        self.registry.detach(self.id);
        tracing::trace!(source = %self.node.id, "staging copy detached");
    }
}

/// Marks a document as exporting; clears the flag on drop
#[derive(Debug)]
pub struct ExportTicket {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// The document currently being edited and previewed
#[derive(Debug)]
pub struct LiveDocument {
    root: ContentNode,
    format: PageFormat,
    zoom: PreviewZoom,
    staging: StagingRegistry,
    exporting: Arc<AtomicBool>,
}

impl LiveDocument {
    pub fn new(root: ContentNode, format: PageFormat) -> Self {
        let mut doc = Self {
            root,
            format,
            zoom: PreviewZoom::default(),
            staging: StagingRegistry::new(),
            exporting: Arc::new(AtomicBool::new(false)),
        };
        doc.apply_zoom();
        doc
    }

    pub fn with_zoom(mut self, zoom: PreviewZoom) -> Self {
        self.set_zoom(zoom);
        self
    }

    pub fn root(&self) -> &ContentNode {
        &self.root
    }

    pub fn format(&self) -> &PageFormat {
        &self.format
    }

    pub fn zoom(&self) -> PreviewZoom {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: PreviewZoom) {
        self.zoom = zoom;
        self.apply_zoom();
    }

    /// Replace the content, keeping the current zoom
    pub fn replace_root(&mut self, root: ContentNode) {
        self.root = root;
        self.apply_zoom();
    }

    fn apply_zoom(&mut self) {
        self.root.style.transform_scale = Some(self.zoom.value());
    }

    /// Deep copy of the live tree as it is right now
    pub fn snapshot(&self) -> ContentNode {
        self.root.clone()
    }

    /// Pages the preview spans, from the unscaled layout height
    pub fn preview_page_count(&self) -> Result<usize> {
        let layout = layout(&self.root, self.format.raster_width_px as f32)?;
        Ok(self.format.pages_for_height(layout.natural_height()))
    }

    pub fn staging(&self) -> &StagingRegistry {
        &self.staging
    }

    /// Claim the export slot; `None` if an export is already running
    pub fn try_begin_export(&self) -> Option<ExportTicket> {
        if self.exporting.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(ExportTicket {
            flag: Arc::clone(&self.exporting),
        })
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }
}
