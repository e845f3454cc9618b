//! Content stream builder
//!
//! Only the operators a sliced page needs: graphics state, the current
//! transformation matrix, rectangles, clipping, fills and XObject painting.

use super::objects::format_real;
use std::fmt::Write;

/// Page content operators, one per line
#[derive(Debug, Default, Clone)]
pub struct ContentStream {
    data: String,
    depth: usize,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Unbalanced `q` count
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn op(&mut self, operands: &[f64], operator: &str) -> &mut Self {
        for v in operands {
            self.data.push_str(&format_real(*v));
            self.data.push(' ');
        }
        self.data.push_str(operator);
        self.data.push('\n');
        self
    }

    /// `q`
    pub fn save_state(&mut self) -> &mut Self {
        self.depth += 1;
        self.op(&[], "q")
    }

    /// `Q`
    pub fn restore_state(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.op(&[], "Q")
    }

    /// `cm`
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.op(&[a, b, c, d, e, f], "cm")
    }

    /// `re`
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op(&[x, y, width, height], "re")
    }

    /// `W`, intersect the clip with the current path
    pub fn clip(&mut self) -> &mut Self {
        self.op(&[], "W")
    }

    /// `n`
    pub fn end_path(&mut self) -> &mut Self {
        self.op(&[], "n")
    }

    /// `f`
    pub fn fill(&mut self) -> &mut Self {
        self.op(&[], "f")
    }

    /// `rg`, components in 0..=1
    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.op(&[r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)], "rg")
    }

    /// `/Name Do`
    pub fn draw_xobject(&mut self, name: &str) -> &mut Self {
        let _ = writeln!(self.data, "/{} Do", name);
        self
    }

    /// Paint an XObject into the rectangle (x, y, width, height)
    ///
    /// Image space is the unit square, so the matrix scales it to the
    /// rectangle and moves it into place.
    pub fn paint_image(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.save_state()
            .transform(width, 0.0, 0.0, height, x, y)
            .draw_xobject(name)
            .restore_state()
    }
}
