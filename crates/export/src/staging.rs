//! Staging copies for capture
//!
//! The live tree is previewed at a zoom and may carry screen-only guides.
//! A capture needs neither, so it works on a normalized deep copy.

use render_model::{Color, ContentNode, Edges, PageFormat};

/// Deep copy of `root` prepared for capture at native scale
///
/// The preview transform is removed, the width is pinned to the page's
/// raster width, the height is left to content with at least one page,
/// outer margins are dropped, the background is made opaque and
/// screen-only nodes are removed. The source tree is untouched.
pub fn normalize(root: &ContentNode, format: &PageFormat, background: Color) -> ContentNode {
    let mut copy = root.clone();
    let style = &mut copy.style;
    style.transform_scale = None;
    style.width = Some(format.raster_width_px as f32);
    style.max_width = None;
    style.height = None;
    style.min_height = Some(format.min_content_height_px());
    style.margin = Edges::ZERO;
    style.background = Some(background.flatten_onto(Color::WHITE));
    copy.strip_screen_only();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_model::{layout, BoxStyle, ContentNode};

    fn preview_tree() -> ContentNode {
        ContentNode::column()
            .styled(|s| {
                s.transform_scale = Some(0.85);
                s.width = Some(600.0);
                s.height = Some(400.0);
                s.margin = Edges::all(24.0);
                s.background = None;
            })
            .child(ContentNode::column().styled(|s| s.height = Some(100.0)))
            .child(ContentNode::column().styled(|s: &mut BoxStyle| {
                s.height = Some(2.0);
                s.screen_only = true;
            }))
    }

    #[test]
    fn test_normalize_resets_root_style() {
        let source = preview_tree();
        let copy = normalize(&source, &PageFormat::a4(), Color::WHITE);

        assert_eq!(copy.style.transform_scale, None);
        assert_eq!(copy.style.width, Some(794.0));
        assert_eq!(copy.style.height, None);
        assert_eq!(copy.style.min_height, Some(1122.0));
        assert_eq!(copy.style.margin, Edges::ZERO);
        assert_eq!(copy.style.background, Some(Color::WHITE));
        assert!(!copy.has_screen_only());
    }

    #[test]
    fn test_source_is_untouched() {
        let source = preview_tree();
        let before = source.clone();
        let _ = normalize(&source, &PageFormat::a4(), Color::WHITE);
        assert_eq!(source, before);
        assert!(source.has_screen_only());
    }

    #[test]
    fn test_translucent_background_is_flattened() {
        let copy = normalize(&preview_tree(), &PageFormat::a4(), Color::rgba(0, 0, 0, 0));
        assert_eq!(copy.style.background, Some(Color::WHITE));
    }

    #[test]
    fn test_normalized_layout_is_native_and_one_page() {
        let copy = normalize(&preview_tree(), &PageFormat::letter(), Color::WHITE);
        let laid_out = layout(&copy, 816.0).unwrap();
        assert_eq!(laid_out.scale, 1.0);
        assert_eq!(laid_out.width, 816.0);
        assert_eq!(laid_out.height, PageFormat::letter().min_content_height_px());
    }
}
