//! Geometry and color primitives

use crate::Result;
use serde::{Deserialize, Serialize};

/// A rectangle in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

/// Edge insets (padding or margin)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Edges = Edges::all(0.0);

    pub const fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub const fn bottom(v: f32) -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: v,
            left: 0.0,
        }
    }

    pub const fn top(v: f32) -> Self {
        Self {
            top: v,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    // Neutral palette used by the letter layouts
    pub const SLATE_50: Color = Color::rgb(0xf8, 0xfa, 0xfc);
    pub const SLATE_100: Color = Color::rgb(0xf1, 0xf5, 0xf9);
    pub const SLATE_200: Color = Color::rgb(0xe2, 0xe8, 0xf0);
    pub const SLATE_300: Color = Color::rgb(0xcb, 0xd5, 0xe1);
    pub const SLATE_400: Color = Color::rgb(0x94, 0xa3, 0xb8);
    pub const SLATE_500: Color = Color::rgb(0x64, 0x74, 0x8b);
    pub const SLATE_600: Color = Color::rgb(0x47, 0x55, 0x69);
    pub const SLATE_700: Color = Color::rgb(0x33, 0x41, 0x55);
    pub const SLATE_800: Color = Color::rgb(0x1e, 0x29, 0x3b);
    pub const SLATE_900: Color = Color::rgb(0x0f, 0x17, 0x2a);

    /// Parse `#rgb` / `#rrggbb`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let [r, g, b] = doc_model::parse_hex_color(hex)?;
        Ok(Self::rgb(r, g, b))
    }

    pub fn to_hex(&self) -> String {
        doc_model::format_hex_color([self.r, self.g, self.b])
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Same color at the given opacity (0.0 to 1.0)
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Composite this color over an opaque backdrop
    pub fn flatten_onto(&self, backdrop: Color) -> Color {
        if self.is_opaque() {
            return *self;
        }
        let alpha = self.a as u32;
        let blend = |fg: u8, bg: u8| -> u8 {
            ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
        };
        Color::rgb(
            blend(self.r, backdrop.r),
            blend(self.g, backdrop.g),
            blend(self.b, backdrop.b),
        )
    }

    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
