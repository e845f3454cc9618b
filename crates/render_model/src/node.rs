//! The renderable content tree

use crate::{Color, Edges, RenderError, Result};
use doc_model::{FontFamily, LogoSource, NodeId};
use std::io::Cursor;
use std::sync::Arc;

/// Main-axis direction of a block's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Column,
    Row,
}

/// Cross-axis alignment of children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

/// Main-axis distribution of children in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Horizontal alignment of text lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A border line on one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
    pub dashed: bool,
}

impl Border {
    pub fn solid(width: f32, color: Color) -> Self {
        Self {
            width,
            color,
            dashed: false,
        }
    }

    pub fn dashed(width: f32, color: Color) -> Self {
        Self {
            width,
            color,
            dashed: true,
        }
    }
}

/// Positioning of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// Takes part in the parent's flow
    #[default]
    Flow,
    /// Drawn over the parent's box without affecting its size.
    /// Offsets are from the parent's border edges.
    Overlay {
        top: Option<f32>,
        right: Option<f32>,
        bottom: Option<f32>,
        left: Option<f32>,
    },
}

/// Box styling of a node
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    /// Fixed width; `None` stretches or shrinks to content
    pub width: Option<f32>,
    /// Fixed height; `None` is automatic
    pub height: Option<f32>,
    pub min_height: Option<f32>,
    pub max_width: Option<f32>,
    pub padding: Edges,
    pub margin: Edges,
    pub background: Option<Color>,
    pub border_top: Option<Border>,
    pub border_bottom: Option<Border>,
    /// Outline around the whole box
    pub outline: Option<Border>,
    pub corner_radius: f32,
    pub direction: Direction,
    pub align: Align,
    pub justify: Justify,
    pub gap: f32,
    /// Take the free space left in a column or row
    pub grow: bool,
    /// Visual scale applied around the top-left corner
    pub transform_scale: Option<f32>,
    /// Shown in the editor only; never part of an exported document
    pub screen_only: bool,
    pub position: Position,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            min_height: None,
            max_width: None,
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            background: None,
            border_top: None,
            border_bottom: None,
            outline: None,
            corner_radius: 0.0,
            direction: Direction::Column,
            align: Align::Stretch,
            justify: Justify::Start,
            gap: 0.0,
            grow: false,
            transform_scale: None,
            screen_only: false,
            position: Position::Flow,
        }
    }
}

/// Text styling shared by all spans of a text node
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: FontFamily,
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub uppercase: bool,
    /// Extra spacing between characters, in em
    pub letter_spacing: f32,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Sans,
            font_size: 16.0,
            line_height: 1.5,
            color: Color::SLATE_900,
            bold: false,
            italic: false,
            uppercase: false,
            letter_spacing: 0.0,
            align: TextAlign::Left,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f32) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_letter_spacing(mut self, em: f32) -> Self {
        self.letter_spacing = em;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// A run of text with inline overrides
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Color>,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl From<&doc_model::markup::StyledRun> for TextSpan {
    fn from(run: &doc_model::markup::StyledRun) -> Self {
        Self {
            text: run.text.clone(),
            bold: run.bold,
            italic: run.italic,
            underline: run.underline,
            color: None,
        }
    }
}

/// Pixel source of an image node
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Encoded image bytes available to the renderer
    Embedded {
        mime_type: String,
        bytes: Arc<[u8]>,
        width_px: u32,
        height_px: u32,
    },
    /// Pixels live on another origin and cannot be captured
    Remote(String),
}

impl ImageSource {
    /// Decode the header of an embedded image to learn its size
    pub fn embedded(mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let (width_px, height_px) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| RenderError::Image(e.to_string()))?
            .into_dimensions()
            .map_err(|e| RenderError::Image(e.to_string()))?;
        Ok(ImageSource::Embedded {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
            width_px,
            height_px,
        })
    }

    /// Width over height, if known
    pub fn aspect_ratio(&self) -> Option<f32> {
        match self {
            ImageSource::Embedded {
                width_px, height_px, ..
            } if *width_px > 0 && *height_px > 0 => Some(*width_px as f32 / *height_px as f32),
            _ => None,
        }
    }
}

impl TryFrom<LogoSource> for ImageSource {
    type Error = RenderError;

    fn try_from(source: LogoSource) -> Result<Self> {
        match source {
            LogoSource::Embedded { mime_type, bytes } => ImageSource::embedded(mime_type, bytes),
            LogoSource::Remote(url) => Ok(ImageSource::Remote(url)),
        }
    }
}

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A box that lays out its children
    Block,
    /// Wrapped text
    Text { spans: Vec<TextSpan>, style: TextStyle },
    /// An image scaled into the node's box
    Image(ImageSource),
}

/// A node of the renderable content tree
///
/// `Clone` is a deep copy; image bytes are shared immutably.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub style: BoxStyle,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            style: BoxStyle::default(),
            children: Vec::new(),
        }
    }

    /// A column block
    pub fn column() -> Self {
        Self::with_kind(NodeKind::Block)
    }

    /// A row block
    pub fn row() -> Self {
        let mut node = Self::with_kind(NodeKind::Block);
        node.style.direction = Direction::Row;
        node
    }

    /// Single-span text
    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self::rich_text(vec![TextSpan::plain(text)], style)
    }

    pub fn rich_text(spans: Vec<TextSpan>, style: TextStyle) -> Self {
        Self::with_kind(NodeKind::Text { spans, style })
    }

    pub fn image(source: ImageSource) -> Self {
        Self::with_kind(NodeKind::Image(source))
    }

    /// Modify the box style in place
    pub fn styled(mut self, f: impl FnOnce(&mut BoxStyle)) -> Self {
        f(&mut self.style);
        self
    }

    pub fn child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ContentNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Depth-first search by id
    pub fn find(&self, id: NodeId) -> Option<&ContentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ContentNode::node_count).sum::<usize>()
    }

    /// Whether any node in the subtree is screen-only
    pub fn has_screen_only(&self) -> bool {
        self.style.screen_only || self.children.iter().any(ContentNode::has_screen_only)
    }

    /// Drop screen-only descendants
    pub fn strip_screen_only(&mut self) {
        self.children.retain(|c| !c.style.screen_only);
        for child in &mut self.children {
            child.strip_screen_only();
        }
    }

    /// Concatenated text of the subtree
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeKind::Text { spans, .. } = &self.kind {
            for span in spans {
                out.push_str(&span.text);
            }
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
