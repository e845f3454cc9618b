//! Document-level structures: version, info dictionary, page tree

use super::objects::{PdfDictionary, PdfObject};
use chrono::{DateTime, Offset, TimeZone};
use render_model::PageFormat;
use serde::{Deserialize, Serialize};

/// Points per millimetre
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Millimetres to PDF points
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// PDF version written in the header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdfVersion {
    #[default]
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "1.7")]
    V1_7,
}

impl PdfVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfVersion::V1_4 => "1.4",
            PdfVersion::V1_7 => "1.7",
        }
    }
}

/// Format a timestamp as a PDF date string, `D:YYYYMMDDHHmmSS+HH'mm'`
pub fn pdf_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let offset = at.offset().fix().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!(
        "D:{}{}{:02}'{:02}'",
        at.format("%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

/// The `/Info` dictionary contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Already in PDF date form
    pub creation_date: Option<String>,
}

impl DocumentInfo {
    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        let fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
            ("CreationDate", &self.creation_date),
        ];
        for (key, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                dict.insert(key, PdfObject::text(value));
            }
        }
        if !self.keywords.is_empty() {
            dict.insert("Keywords", PdfObject::text(&self.keywords.join(", ")));
        }
        dict
    }
}

/// Page bounds in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub width: f64,
    pub height: f64,
}

impl MediaBox {
    pub fn from_format(format: &PageFormat) -> Self {
        Self {
            width: mm_to_pt(format.width_mm as f64),
            height: mm_to_pt(format.height_mm as f64),
        }
    }

    pub fn to_array(&self) -> PdfObject {
        PdfObject::rect(0.0, 0.0, self.width, self.height)
    }
}

pub fn create_catalog(pages: u32) -> PdfDictionary {
    PdfDictionary::typed("Catalog").with("Pages", PdfObject::reference(pages))
}

pub fn create_pages(kids: &[u32], media_box: MediaBox) -> PdfDictionary {
    PdfDictionary::typed("Pages")
        .with(
            "Kids",
            kids.iter().map(|&id| PdfObject::reference(id)).collect::<Vec<_>>(),
        )
        .with("Count", kids.len())
        .with("MediaBox", media_box.to_array())
}

/// A page whose resources are just named image XObjects
pub fn create_page(parent: u32, contents: u32, images: &[(String, u32)]) -> PdfDictionary {
    let mut xobjects = PdfDictionary::new();
    for (name, id) in images {
        xobjects.insert(name.as_str(), PdfObject::reference(*id));
    }
    let resources = PdfDictionary::new()
        .with(
            "ProcSet",
            vec![PdfObject::name("PDF"), PdfObject::name("ImageC")],
        )
        .with("XObject", xobjects);
    PdfDictionary::typed("Page")
        .with("Parent", PdfObject::reference(parent))
        .with("Contents", PdfObject::reference(contents))
        .with("Resources", resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_a4_media_box() {
        let media = MediaBox::from_format(&PageFormat::a4());
        assert!((media.width - 595.2756).abs() < 1e-3);
        assert!((media.height - 841.8898).abs() < 1e-3);
    }

    #[test]
    fn test_pdf_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(pdf_date(&at), "D:20240309140500+00'00'");

        let offset = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        let at = offset.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        assert_eq!(pdf_date(&at), "D:20240309080000-05'30'");
    }

    #[test]
    fn test_info_skips_empty_fields() {
        let info = DocumentInfo {
            title: Some("Letter".into()),
            author: Some(String::new()),
            keywords: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        let dict = info.to_dictionary();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("Keywords"), Some(&PdfObject::text("a, b")));
    }
}
