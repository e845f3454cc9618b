//! Box layout of a content tree into positioned draw primitives
//!
//! A small flexbox subset: blocks stack their children in a column or a
//! row, with gaps, cross-axis alignment, row justification and `grow`.
//! Overlay children are positioned against their parent's border box once
//! its size is known and never affect it.

use crate::text::{baseline_offset, break_lines, line_height, max_content_width};
use crate::{
    Align, Border, Color, ContentNode, Direction, ImageSource, Justify, NodeKind, Position, Rect,
    RenderError, Result, TextAlign,
};
use doc_model::FontFamily;

/// One styled run of a text line
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Color,
}

/// A single line of text anchored at `x`
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    /// Left edge, center or right edge depending on `anchor`
    pub x: f32,
    pub baseline: f32,
    pub anchor: TextAlign,
    pub family: FontFamily,
    pub font_size: f32,
    pub letter_spacing: f32,
    pub runs: Vec<TextRun>,
}

/// A positioned drawing instruction in CSS pixels
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Fill {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Stroke {
        rect: Rect,
        border: Border,
        radius: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        border: Border,
    },
    Text(TextPrimitive),
    Image {
        rect: Rect,
        source: ImageSource,
    },
}

impl Primitive {
    fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Primitive::Fill { rect, .. }
            | Primitive::Stroke { rect, .. }
            | Primitive::Image { rect, .. } => rect.translate(dx, dy),
            Primitive::Line { x1, y1, x2, y2, .. } => {
                *x1 += dx;
                *x2 += dx;
                *y1 += dy;
                *y2 += dy;
            }
            Primitive::Text(text) => {
                text.x += dx;
                text.baseline += dy;
            }
        }
    }
}

/// Result of laying out a tree
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Visual width, after the root's scale transform
    pub width: f32,
    /// Visual height, after the root's scale transform
    pub height: f32,
    /// Scale transform to apply to every primitive
    pub scale: f32,
    /// Primitives in unscaled coordinates, in paint order
    pub primitives: Vec<Primitive>,
}

impl Layout {
    /// Height before the scale transform
    pub fn natural_height(&self) -> f32 {
        self.height / self.scale
    }

    pub fn natural_width(&self) -> f32 {
        self.width / self.scale
    }

    /// Remote images that cannot be drawn from local pixels
    pub fn remote_images(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Image {
                source: ImageSource::Remote(url),
                ..
            } => Some(url.as_str()),
            _ => None,
        })
    }
}

/// Lay out `root` in a container `available_width` CSS pixels wide
///
/// A scale transform on the root is honored: the reported size is the
/// visual size, and `scale` tells the painter how to map primitives.
pub fn layout(root: &ContentNode, available_width: f32) -> Result<Layout> {
    if !available_width.is_finite() || available_width <= 0.0 {
        return Err(RenderError::InvalidLayout(format!(
            "available width {} is not positive",
            available_width
        )));
    }

    let margin = root.style.margin;
    let width = resolve_width(root, available_width - margin.horizontal(), Align::Stretch);
    let mut engine = LayoutEngine::default();
    let height = engine.layout_node(root, margin.left, margin.top, width);

    let natural_width = width + margin.horizontal();
    let natural_height = height + margin.vertical();
    if !natural_height.is_finite() || natural_height < 0.0 || !natural_width.is_finite() {
        return Err(RenderError::InvalidLayout(format!(
            "computed size {}x{} is not finite",
            natural_width, natural_height
        )));
    }

    let scale = match root.style.transform_scale {
        Some(s) if s.is_finite() && s > 0.0 => s,
        Some(s) => {
            return Err(RenderError::InvalidLayout(format!("invalid scale transform {}", s)));
        }
        None => 1.0,
    };

    Ok(Layout {
        width: natural_width * scale,
        height: natural_height * scale,
        scale,
        primitives: engine.out,
    })
}

/// Border-box width a node wants when nothing wraps
pub fn max_content(node: &ContentNode) -> f32 {
    let style = &node.style;
    let width = if let Some(w) = style.width {
        w
    } else {
        let content = match &node.kind {
            NodeKind::Text { spans, style } => max_content_width(spans, style),
            NodeKind::Image(source) => match (node.style.height, source.aspect_ratio()) {
                (Some(h), aspect) => (h - style.padding.vertical()).max(0.0) * aspect.unwrap_or(1.0),
                (None, _) => match source {
                    ImageSource::Embedded { width_px, .. } => *width_px as f32,
                    ImageSource::Remote(_) => 0.0,
                },
            },
            NodeKind::Block => {
                let flow = node
                    .children
                    .iter()
                    .filter(|c| c.style.position == Position::Flow)
                    .map(|c| max_content(c) + c.style.margin.horizontal());
                match style.direction {
                    Direction::Column => flow.fold(0.0, f32::max),
                    Direction::Row => {
                        let (sum, count) = flow.fold((0.0, 0usize), |(s, n), w| (s + w, n + 1));
                        sum + style.gap * count.saturating_sub(1) as f32
                    }
                }
            }
        };
        content + style.padding.horizontal()
    };
    clamp_width(node, width)
}

fn clamp_width(node: &ContentNode, width: f32) -> f32 {
    match node.style.max_width {
        Some(max) => width.min(max),
        None => width,
    }
}

fn resolve_width(node: &ContentNode, available: f32, align: Align) -> f32 {
    let width = match node.style.width {
        Some(w) => w,
        None if align == Align::Stretch => available,
        None => max_content(node).min(available),
    };
    clamp_width(node, width.max(0.0))
}

#[derive(Default)]
struct LayoutEngine {
    out: Vec<Primitive>,
}

struct Placed {
    range: std::ops::Range<usize>,
    outer_width: f32,
    outer_height: f32,
    grow: bool,
}

impl LayoutEngine {
    fn shift(&mut self, range: std::ops::Range<usize>, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        for p in &mut self.out[range] {
            p.translate(dx, dy);
        }
    }

    /// Lay out a node's border box at (x, y); returns its height
    fn layout_node(&mut self, node: &ContentNode, x: f32, y: f32, width: f32) -> f32 {
        let style = &node.style;
        let background_at = style.background.map(|color| {
            self.out.push(Primitive::Fill {
                rect: Rect::new(x, y, width, 0.0),
                color,
                radius: style.corner_radius,
            });
            self.out.len() - 1
        });

        let top_inset = style.padding.top + style.border_top.map_or(0.0, |b| b.width);
        let bottom_inset = style.padding.bottom + style.border_bottom.map_or(0.0, |b| b.width);
        let content_x = x + style.padding.left;
        let content_y = y + top_inset;
        let content_width = (width - style.padding.horizontal()).max(0.0);

        let content_height = match &node.kind {
            NodeKind::Text { spans, style: text_style } => {
                self.layout_text(spans, text_style, content_x, content_y, content_width)
            }
            NodeKind::Image(source) => {
                let fixed = style.height.map(|h| (h - top_inset - bottom_inset).max(0.0));
                self.layout_image(source, content_x, content_y, content_width, fixed)
            }
            NodeKind::Block => 0.0,
        };

        let mut placed = Vec::new();
        let children_height = match style.direction {
            _ if node.children.is_empty() => 0.0,
            Direction::Column => self.layout_column(node, content_x, content_y, content_width, &mut placed),
            Direction::Row => self.layout_row(node, content_x, content_y, content_width, &mut placed),
        };

        let natural = content_height.max(children_height) + top_inset + bottom_inset;
        let height = style
            .height
            .unwrap_or(natural)
            .max(style.min_height.unwrap_or(0.0));

        // Hand free space to growing children of a column
        let extra = height - natural;
        let growers = placed.iter().filter(|p| p.grow).count();
        if style.direction == Direction::Column && extra > 0.0 && growers > 0 {
            let share = extra / growers as f32;
            let mut offset = 0.0;
            for p in &placed {
                self.shift(p.range.clone(), 0.0, offset);
                if p.grow {
                    offset += share;
                }
            }
        }

        if let Some(index) = background_at {
            if let Primitive::Fill { rect, .. } = &mut self.out[index] {
                rect.height = height;
            }
        }
        if let Some(border) = style.border_top {
            let cy = y + border.width / 2.0;
            self.out.push(Primitive::Line { x1: x, y1: cy, x2: x + width, y2: cy, border });
        }
        if let Some(border) = style.border_bottom {
            let cy = y + height - border.width / 2.0;
            self.out.push(Primitive::Line { x1: x, y1: cy, x2: x + width, y2: cy, border });
        }
        if let Some(border) = style.outline {
            self.out.push(Primitive::Stroke {
                rect: Rect::new(x, y, width, height),
                border,
                radius: style.corner_radius,
            });
        }

        self.layout_overlays(node, Rect::new(x, y, width, height));
        height
    }

    fn layout_column(
        &mut self,
        node: &ContentNode,
        x: f32,
        y: f32,
        width: f32,
        placed: &mut Vec<Placed>,
    ) -> f32 {
        let style = &node.style;
        let mut cursor = y;
        let flow = node.children.iter().filter(|c| c.style.position == Position::Flow);

        for (i, child) in flow.enumerate() {
            if i > 0 {
                cursor += style.gap;
            }
            let margin = child.style.margin;
            let available = width - margin.horizontal();
            let child_width = resolve_width(child, available, style.align);
            let dx = match style.align {
                Align::Center => (available - child_width) / 2.0,
                Align::End => available - child_width,
                Align::Start | Align::Stretch => 0.0,
            };

            let start = self.out.len();
            let h = self.layout_node(child, x + margin.left + dx, cursor + margin.top, child_width);
            let outer_height = margin.top + h + margin.bottom;
            placed.push(Placed {
                range: start..self.out.len(),
                outer_width: child_width + margin.horizontal(),
                outer_height,
                grow: child.style.grow,
            });
            cursor += outer_height;
        }
        cursor - y
    }

    fn layout_row(
        &mut self,
        node: &ContentNode,
        x: f32,
        y: f32,
        width: f32,
        placed: &mut Vec<Placed>,
    ) -> f32 {
        let style = &node.style;
        let flow: Vec<&ContentNode> = node
            .children
            .iter()
            .filter(|c| c.style.position == Position::Flow)
            .collect();
        if flow.is_empty() {
            return 0.0;
        }

        let gaps = style.gap * (flow.len() - 1) as f32;
        let mut widths: Vec<f32> = flow.iter().map(|c| max_content(c)).collect();
        let margins: f32 = flow.iter().map(|c| c.style.margin.horizontal()).sum();
        let used: f32 = widths.iter().sum::<f32>() + margins + gaps;

        if used > width {
            // Shrink children without a fixed width, in proportion to their size
            let shrinkable: f32 = flow
                .iter()
                .zip(&widths)
                .filter(|(c, _)| c.style.width.is_none())
                .map(|(_, w)| *w)
                .sum();
            if shrinkable > 0.0 {
                let overflow = used - width;
                for (child, w) in flow.iter().zip(widths.iter_mut()) {
                    if child.style.width.is_none() {
                        *w = (*w - overflow * *w / shrinkable).max(0.0);
                    }
                }
            }
        } else {
            let growers = flow.iter().filter(|c| c.style.grow).count();
            if growers > 0 {
                let share = (width - used) / growers as f32;
                for (child, w) in flow.iter().zip(widths.iter_mut()) {
                    if child.style.grow {
                        *w += share;
                    }
                }
            }
        }

        let mut cursor = x;
        for (child, child_width) in flow.iter().zip(&widths) {
            let margin = child.style.margin;
            let start = self.out.len();
            let h = self.layout_node(child, cursor + margin.left, y + margin.top, *child_width);
            let outer_width = child_width + margin.horizontal();
            placed.push(Placed {
                range: start..self.out.len(),
                outer_width,
                outer_height: margin.top + h + margin.bottom,
                grow: child.style.grow,
            });
            cursor += outer_width + style.gap;
        }

        let row_height = placed.iter().map(|p| p.outer_height).fold(0.0, f32::max);
        let total_width: f32 = placed.iter().map(|p| p.outer_width).sum::<f32>() + gaps;
        let free = (width - total_width).max(0.0);
        let count = placed.len();

        for (i, p) in placed.iter().enumerate() {
            let dx = match style.justify {
                Justify::Start => 0.0,
                Justify::Center => free / 2.0,
                Justify::End => free,
                Justify::SpaceBetween if count > 1 => free * i as f32 / (count - 1) as f32,
                Justify::SpaceBetween => 0.0,
            };
            let dy = match style.align {
                Align::Center => (row_height - p.outer_height) / 2.0,
                Align::End => row_height - p.outer_height,
                Align::Start | Align::Stretch => 0.0,
            };
            self.shift(p.range.clone(), dx, dy);
        }
        row_height
    }

    fn layout_overlays(&mut self, node: &ContentNode, frame: Rect) {
        for child in &node.children {
            let Position::Overlay { top, right, bottom, left } = child.style.position else {
                continue;
            };
            let width = match (child.style.width, left, right) {
                (Some(w), _, _) => w,
                (None, Some(l), Some(r)) => (frame.width - l - r).max(0.0),
                (None, _, _) => max_content(child).min(frame.width),
            };
            let start = self.out.len();
            let height = self.layout_node(child, 0.0, 0.0, width);

            let x = match (left, right) {
                (Some(l), _) => frame.x + l,
                (None, Some(r)) => frame.right() - r - width,
                (None, None) => frame.x,
            };
            let y = match (top, bottom) {
                (Some(t), _) => frame.y + t,
                (None, Some(b)) => frame.bottom() - b - height,
                (None, None) => frame.y,
            };
            self.shift(start..self.out.len(), x, y);
        }
    }

    fn layout_text(
        &mut self,
        spans: &[crate::TextSpan],
        style: &crate::TextStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> f32 {
        let lines = break_lines(spans, style, width);
        let lh = line_height(style);
        let anchor_x = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x + width / 2.0,
            TextAlign::Right => x + width,
        };

        for (i, line) in lines.iter().enumerate() {
            if line.runs.is_empty() {
                continue;
            }
            let runs = line
                .runs
                .iter()
                .map(|run| {
                    let span = &spans[run.span];
                    TextRun {
                        text: run.text.clone(),
                        bold: style.bold || span.bold,
                        italic: style.italic || span.italic,
                        underline: span.underline,
                        color: span.color.unwrap_or(style.color),
                    }
                })
                .collect();
            self.out.push(Primitive::Text(TextPrimitive {
                x: anchor_x,
                baseline: y + i as f32 * lh + baseline_offset(style),
                anchor: style.align,
                family: style.family,
                font_size: style.font_size,
                letter_spacing: style.letter_spacing,
                runs,
            }));
        }
        lines.len() as f32 * lh
    }

    fn layout_image(
        &mut self,
        source: &ImageSource,
        x: f32,
        y: f32,
        width: f32,
        fixed_height: Option<f32>,
    ) -> f32 {
        let aspect = source.aspect_ratio().unwrap_or(1.0);
        let height = fixed_height.unwrap_or(width / aspect);

        // Fit inside the box, keeping the aspect ratio
        let (draw_w, draw_h) = if width / height.max(f32::EPSILON) > aspect {
            (height * aspect, height)
        } else {
            (width, width / aspect)
        };
        self.out.push(Primitive::Image {
            rect: Rect::new(x, y + (height - draw_h) / 2.0, draw_w, draw_h),
            source: source.clone(),
        });
        height
    }
}
