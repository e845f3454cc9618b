//! Logo references stored on a profile

use crate::{DocModelError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Where a logo's pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// Bytes uploaded by the user and carried inline as a `data:` URL
    Embedded { mime_type: String, bytes: Vec<u8> },
    /// A URL on another origin; its pixels are not available for capture
    Remote(String),
}

impl LogoSource {
    /// Parse a profile's `logoUrl` value
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if let Some(rest) = url.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| DocModelError::InvalidLogo("data URL has no payload".to_string()))?;
            let mut parts = meta.split(';');
            let mime_type = parts.next().unwrap_or_default().to_ascii_lowercase();
            if !mime_type.starts_with("image/") {
                return Err(DocModelError::InvalidLogo(format!(
                    "unsupported media type '{}'",
                    mime_type
                )));
            }
            if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
                return Err(DocModelError::InvalidLogo(
                    "only base64 data URLs are supported".to_string(),
                ));
            }
            let bytes = STANDARD
                .decode(payload.trim())
                .map_err(|e| DocModelError::InvalidLogo(e.to_string()))?;
            Ok(LogoSource::Embedded { mime_type, bytes })
        } else if url.is_empty() {
            Err(DocModelError::InvalidLogo("empty logo URL".to_string()))
        } else {
            Ok(LogoSource::Remote(url.to_string()))
        }
    }

    /// Build a `data:` URL logo from raw file bytes
    pub fn embed(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        LogoSource::Embedded {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Render back to the `logoUrl` string form
    pub fn to_url(&self) -> String {
        match self {
            LogoSource::Embedded { mime_type, bytes } => {
                format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
            }
            LogoSource::Remote(url) => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_url() {
        let source = LogoSource::parse("data:image/png;base64,AAEC").unwrap();
        assert_eq!(
            source,
            LogoSource::Embedded {
                mime_type: "image/png".to_string(),
                bytes: vec![0, 1, 2],
            }
        );
        assert_eq!(source.to_url(), "data:image/png;base64,AAEC");
    }

    #[test]
    fn test_parse_remote() {
        let source = LogoSource::parse("https://cdn.example.com/logo.png").unwrap();
        assert!(matches!(source, LogoSource::Remote(_)));
    }

    #[test]
    fn test_rejects_non_image() {
        assert!(LogoSource::parse("data:text/plain;base64,AAEC").is_err());
        assert!(LogoSource::parse("data:image/png,rawbytes").is_err());
        assert!(LogoSource::parse("data:image/png;base64,***").is_err());
        assert!(LogoSource::parse("  ").is_err());
    }
}
