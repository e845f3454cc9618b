//! Letter content and the on-disk letter file

use crate::markup::{parse_body, Paragraph};
use crate::{CompanyProfile, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_BODY: &str = "<p>Dear Ms. Smith,</p><p><br></p><p>I hope this letter finds you well. \
Following our recent discussion regarding the potential synergy between our organizations, \
I am pleased to submit this formal proposal for your review.</p><p><br></p><p>At \
<strong>Acme Corp Solutions</strong>, we believe that a strategic partnership would mutually \
benefit our objectives for the upcoming quarter. We have outlined the key deliverables and \
timeline in the attached documentation.</p><p><br></p><p>We are excited about the possibility \
of working together and look forward to your positive response.</p><p><br></p><p>Sincerely,</p>\
<p><br></p><p><strong>John Doe</strong><br>Chief Executive Officer</p>";

/// The letter being written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LetterContent {
    pub recipient_name: String,
    /// Recipient address, lines separated by `\n`
    pub recipient_address: String,
    /// Display date, already formatted
    pub date: String,
    pub subject: String,
    /// Rich-text body as an HTML fragment
    pub body: String,
}

impl Default for LetterContent {
    fn default() -> Self {
        Self {
            recipient_name: "Jane Smith".to_string(),
            recipient_address: "Director of Operations\nGlobal Industries Inc.\n456 Corporate Blvd\nMetropolis, NY 10012".to_string(),
            date: today_display_date(),
            subject: "Proposal for Q4 Strategic Partnership".to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

impl LetterContent {
    /// Parse the body markup into paragraphs
    pub fn paragraphs(&self) -> Result<Vec<Paragraph>> {
        parse_body(&self.body)
    }
}

/// Today's date in the long US form used by the editor ("October 15, 2026")
pub fn today_display_date() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}

/// A letter file: profile plus content
///
/// The profile is optional on disk; a missing one means the default profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterFile {
    #[serde(default)]
    pub profile: CompanyProfile,
    #[serde(default)]
    pub content: LetterContent,
}

impl LetterFile {
    /// Parse a letter file from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
