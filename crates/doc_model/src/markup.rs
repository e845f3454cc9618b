//! Letter body markup
//!
//! The editor stores the letter body as a small HTML fragment
//! (`<p>`, `<br>`, `<strong>`, `<em>`, `<u>` and entities). This module
//! parses that fragment into paragraphs of styled runs.

use crate::{DocModelError, Result};
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex_lite::Regex;
use std::sync::OnceLock;

/// A run of text sharing the same inline style
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// A paragraph of the letter body
///
/// An empty paragraph (`<p><br></p>`) renders as one blank line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub runs: Vec<StyledRun>,
}

impl Paragraph {
    /// Plain text of the paragraph
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph has no visible text
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    fn push(&mut self, text: &str, style: InlineStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.bold == style.bold && last.italic == style.italic && last.underline == style.underline {
                last.text.push_str(text);
                return;
            }
        }
        self.runs.push(StyledRun {
            text: text.to_string(),
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
        });
    }

    /// Trim leading/trailing spaces and a trailing line break
    fn finish(mut self) -> Self {
        if let Some(first) = self.runs.first_mut() {
            first.text = first.text.trim_start_matches(' ').to_string();
        }
        if let Some(last) = self.runs.last_mut() {
            last.text = last.text.trim_end_matches(' ').trim_end_matches('\n').to_string();
        }
        self.runs.retain(|r| !r.text.is_empty());
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    underline: bool,
}

fn line_break_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").ok()).as_ref()
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "hellip" => Some("\u{2026}"),
        "rsquo" => Some("\u{2019}"),
        "lsquo" => Some("\u{2018}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        "bull" => Some("\u{2022}"),
        other => resolve_predefined_entity(other),
    }
}

/// Collapse whitespace runs the way an HTML renderer does
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Parse an HTML body fragment into paragraphs
pub fn parse_body(html: &str) -> Result<Vec<Paragraph>> {
    let normalized = match line_break_pattern() {
        Some(re) => re.replace_all(html, "<br/>"),
        None => html.into(),
    };
    let wrapped = format!("<body>{}</body>", normalized);

    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().check_end_names = false;

    let mut paragraphs = Vec::new();
    let mut current = Paragraph::default();
    let mut in_paragraph = false;
    let mut bold_depth = 0usize;
    let mut italic_depth = 0usize;
    let mut underline_depth = 0usize;

    let style = |b: usize, i: usize, u: usize| InlineStyle {
        bold: b > 0,
        italic: i > 0,
        underline: u > 0,
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref().to_ascii_lowercase().as_slice() {
                b"p" | b"div" | b"li" | b"h1" | b"h2" | b"h3" => {
                    if !current.runs.is_empty() {
                        paragraphs.push(std::mem::take(&mut current).finish());
                    }
                    in_paragraph = true;
                }
                b"strong" | b"b" => bold_depth += 1,
                b"em" | b"i" => italic_depth += 1,
                b"u" => underline_depth += 1,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref().to_ascii_lowercase().as_slice() {
                b"p" | b"div" | b"li" | b"h1" | b"h2" | b"h3" => {
                    paragraphs.push(std::mem::take(&mut current).finish());
                    in_paragraph = false;
                }
                b"strong" | b"b" => bold_depth = bold_depth.saturating_sub(1),
                b"em" | b"i" => italic_depth = italic_depth.saturating_sub(1),
                b"u" => underline_depth = underline_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref().eq_ignore_ascii_case(b"br") {
                    current.push("\n", style(bold_depth, italic_depth, underline_depth));
                }
            }
            Ok(Event::Text(e)) => {
                let raw = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| DocModelError::Markup(err.to_string()))?;
                let text = unescape_with(&raw, resolve_entity)
                    .map_err(|err| DocModelError::Markup(err.to_string()))?;
                let collapsed = collapse_whitespace(&text);
                if !in_paragraph && current.runs.is_empty() && collapsed.trim().is_empty() {
                    continue;
                }
                current.push(&collapsed, style(bold_depth, italic_depth, underline_depth));
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(DocModelError::Markup(err.to_string())),
            _ => {}
        }
    }

    if !current.runs.is_empty() {
        paragraphs.push(current.finish());
    }

    Ok(paragraphs)
}
