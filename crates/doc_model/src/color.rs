//! Hex color parsing for profile colors

use crate::{DocModelError, Result};
use regex_lite::Regex;
use std::sync::OnceLock;

fn hex_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok())
        .as_ref()
}

/// Parse a CSS-style hex color (`#0ea5e9`, `0ea5e9` or the short `#fff`)
/// into its RGB components.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3]> {
    let trimmed = value.trim();
    let caps = hex_pattern()
        .and_then(|re| re.captures(trimmed))
        .ok_or_else(|| DocModelError::InvalidColor(value.to_string()))?;
    let digits = &caps[1];

    let channel = |s: &str| {
        u8::from_str_radix(s, 16).map_err(|_| DocModelError::InvalidColor(value.to_string()))
    };

    if digits.len() == 3 {
        let mut rgb = [0u8; 3];
        for (i, c) in digits.chars().enumerate() {
            let nibble = channel(&c.to_string())?;
            rgb[i] = nibble * 17;
        }
        Ok(rgb)
    } else {
        Ok([
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ])
    }
}

/// Format RGB components as a lowercase `#rrggbb` string
pub fn format_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
