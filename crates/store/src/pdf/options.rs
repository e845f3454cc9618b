//! PDF export options

use super::document::{pdf_date, DocumentInfo, PdfVersion};
use serde::{Deserialize, Serialize};

/// Producer string written into every document
pub const PRODUCER: &str = concat!("Letterhead PDF Export ", env!("CARGO_PKG_VERSION"));

/// Options for PDF assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_creator")]
    pub creator: Option<String>,
    /// Flate-compress content streams and image samples
    #[serde(default = "default_true")]
    pub compress: bool,
    #[serde(default)]
    pub pdf_version: PdfVersion,
    /// Stamp `/CreationDate` with the local time at assembly
    #[serde(default = "default_true")]
    pub stamp_creation_date: bool,
}

fn default_creator() -> Option<String> {
    Some("Letterhead".to_string())
}

fn default_true() -> bool {
    true
}

impl Default for PdfExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            subject: None,
            keywords: Vec::new(),
            creator: default_creator(),
            compress: true,
            pdf_version: PdfVersion::default(),
            stamp_creation_date: true,
        }
    }
}

impl PdfExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Skip the creation date so output is byte-for-byte reproducible
    pub fn without_creation_date(mut self) -> Self {
        self.stamp_creation_date = false;
        self
    }

    /// Info dictionary contents for a document assembled now
    pub fn document_info(&self) -> DocumentInfo {
        DocumentInfo {
            title: self.title.clone(),
            author: self.author.clone(),
            subject: self.subject.clone(),
            keywords: self.keywords.clone(),
            creator: self.creator.clone(),
            producer: Some(PRODUCER.to_string()),
            creation_date: self
                .stamp_creation_date
                .then(|| pdf_date(&chrono::Local::now())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options: PdfExportOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PdfExportOptions::default());
        assert!(options.compress);
        assert_eq!(options.creator.as_deref(), Some("Letterhead"));
    }

    #[test]
    fn test_document_info() {
        let info = PdfExportOptions::new()
            .with_title("Offer")
            .with_author("Acme")
            .without_creation_date()
            .document_info();
        assert_eq!(info.title.as_deref(), Some("Offer"));
        assert!(info.creation_date.is_none());
        assert!(info.producer.unwrap().starts_with("Letterhead"));
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_value(PdfExportOptions::default()).unwrap();
        assert!(json.get("pdfVersion").is_some());
        assert_eq!(json["pdfVersion"], "1.4");
    }
}
