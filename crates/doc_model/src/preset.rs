//! Built-in letterhead presets

use crate::{CompanyProfile, DocModelError, FontFamily, LetterLayout, Result};
use serde::Serialize;

/// Partial profile applied on top of the user's own details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetStyle {
    pub primary_color: &'static str,
    pub accent_color: &'static str,
    pub font_family: FontFamily,
    pub layout: LetterLayout,
    pub show_logo: bool,
}

/// A named preset template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub style: PresetStyle,
}

impl PresetTemplate {
    /// Apply this preset's styling to a profile, keeping the company details
    pub fn apply(&self, profile: &mut CompanyProfile) {
        profile.primary_color = self.style.primary_color.to_string();
        profile.accent_color = self.style.accent_color.to_string();
        profile.font_family = self.style.font_family;
        profile.layout = self.style.layout;
        profile.show_logo = self.style.show_logo;
    }
}

const fn preset(
    id: &'static str,
    name: &'static str,
    primary_color: &'static str,
    accent_color: &'static str,
    font_family: FontFamily,
    layout: LetterLayout,
    show_logo: bool,
) -> PresetTemplate {
    PresetTemplate {
        id,
        name,
        style: PresetStyle {
            primary_color,
            accent_color,
            font_family,
            layout,
            show_logo,
        },
    }
}

/// All built-in presets, in display order
pub const PRESETS: [PresetTemplate; 8] = [
    preset("modern-blue", "Modern Tech", "#0f172a", "#0ea5e9", FontFamily::Sans, LetterLayout::Modern, true),
    preset("executive-dark", "Executive", "#1a1a1a", "#d4af37", FontFamily::Serif, LetterLayout::Executive, true),
    preset("creative-pop", "Creative Studio", "#4f46e5", "#f43f5e", FontFamily::Grotesk, LetterLayout::Creative, true),
    preset("classic-serif", "Legal Classic", "#1c1917", "#b91c1c", FontFamily::Serif, LetterLayout::Classic, false),
    preset("bold-brand", "Bold Brand", "#000000", "#000000", FontFamily::Display, LetterLayout::Bold, true),
    preset("minimal-clean", "Clean Minimal", "#334155", "#94a3b8", FontFamily::Sans, LetterLayout::Minimal, true),
    preset("nature-green", "Eco Nature", "#166534", "#86efac", FontFamily::Serif, LetterLayout::Modern, true),
    preset("startup-purple", "SaaS Startup", "#7e22ce", "#d8b4fe", FontFamily::Grotesk, LetterLayout::Modern, true),
];

/// Look up a preset by its id
pub fn find_preset(id: &str) -> Result<&'static PresetTemplate> {
    PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| DocModelError::UnknownPreset(id.to_string()))
}
