//! Company profile: the letterhead design settings

use crate::{LogoSource, Result};
use serde::{Deserialize, Serialize};

/// Font family choice for the whole letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Display,
    Grotesk,
}

/// Header/footer arrangement of the letterhead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LetterLayout {
    Classic,
    #[default]
    Modern,
    Minimal,
    Executive,
    Creative,
    Bold,
}

/// Company profile driving the letterhead design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub name: String,
    /// Postal address, lines separated by `\n`
    pub address: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    /// Logo as a `data:` URL, or a remote URL
    pub logo_url: Option<String>,
    /// Primary brand color (`#rrggbb`)
    pub primary_color: String,
    /// Accent color (`#rrggbb`)
    pub accent_color: String,
    pub font_family: FontFamily,
    pub layout: LetterLayout,

    pub show_logo: bool,
    pub show_header_address: bool,
    pub show_header_contact: bool,
    pub show_footer: bool,
    pub show_footer_divider: bool,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "Acme Corp Solutions".to_string(),
            address: "123 Innovation Way, Tech City, TC 90210".to_string(),
            email: "contact@acmecorp.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            website: "www.acmecorp.com".to_string(),
            logo_url: None,
            primary_color: "#0f172a".to_string(),
            accent_color: "#0ea5e9".to_string(),
            font_family: FontFamily::Sans,
            layout: LetterLayout::Modern,
            show_logo: true,
            show_header_address: true,
            show_header_contact: true,
            show_footer: true,
            show_footer_divider: true,
        }
    }
}

impl CompanyProfile {
    /// Address lines, skipping blank ones
    pub fn address_lines(&self) -> Vec<&str> {
        self.address
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    /// Address joined onto one line with the given separator
    pub fn address_inline(&self, separator: &str) -> String {
        self.address_lines().join(separator)
    }

    /// The logo to draw, if logos are shown and one is set
    pub fn logo(&self) -> Option<Result<LogoSource>> {
        if !self.show_logo {
            return None;
        }
        self.logo_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(LogoSource::parse)
    }

    /// First character of the company name, used as a logo placeholder
    pub fn initial(&self) -> Option<char> {
        self.name.trim().chars().next()
    }
}
