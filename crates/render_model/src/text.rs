//! Text measurement and line breaking
//!
//! Widths are estimated from per-character advances rather than shaped
//! glyphs. The renderer draws each line as a single run anchored at its
//! alignment edge, so estimation error only affects where lines wrap.

use crate::{TextSpan, TextStyle};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Ascent as a fraction of the font size
const ASCENT_EM: f32 = 0.8;
const BOLD_FACTOR: f32 = 1.06;

/// Estimated advance of one character, in em
fn advance_em(c: char) -> f32 {
    match c {
        ' ' | '\u{a0}' => 0.28,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'I' => 0.28,
        'f' | 't' | 'r' | '(' | ')' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' => 0.84,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.64,
        c if c.is_ascii() => 0.52,
        _ => 0.6,
    }
}

/// Estimated width of `text` in CSS pixels
pub fn text_width(text: &str, font_size: f32, bold: bool, letter_spacing_em: f32) -> f32 {
    let factor = if bold { BOLD_FACTOR } else { 1.0 };
    text.chars()
        .filter(|c| *c != '\n')
        .map(|c| (advance_em(c) * factor + letter_spacing_em) * font_size)
        .sum()
}

/// One span's share of a line
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun {
    pub text: String,
    /// Index into the node's spans
    pub span: usize,
}

/// A laid-out line of text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub runs: Vec<LineRun>,
    /// Estimated width without trailing whitespace
    pub width: f32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn push(&mut self, text: &str, span: usize) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.span == span => last.text.push_str(text),
            _ => self.runs.push(LineRun {
                text: text.to_string(),
                span,
            }),
        }
    }

    fn finish(mut self, style: &TextStyle, spans: &[TextSpan]) -> Self {
        for run in &mut self.runs {
            run.text.retain(|c| c != '\n');
        }
        if let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end_matches(' ').len();
            last.text.truncate(trimmed);
        }
        self.runs.retain(|r| !r.text.is_empty());
        self.width = self
            .runs
            .iter()
            .map(|r| run_width(&r.text, r.span, style, spans))
            .sum();
        self
    }
}

fn run_width(text: &str, span: usize, style: &TextStyle, spans: &[TextSpan]) -> f32 {
    let bold = style.bold || spans.get(span).is_some_and(|s| s.bold);
    text_width(text, style.font_size, bold, style.letter_spacing)
}

fn display_text(span: &TextSpan, style: &TextStyle) -> String {
    if style.uppercase {
        span.text.to_uppercase()
    } else {
        span.text.clone()
    }
}

/// Height of one line in CSS pixels
pub fn line_height(style: &TextStyle) -> f32 {
    style.font_size * style.line_height
}

/// Distance from the top of a line box to its baseline
pub fn baseline_offset(style: &TextStyle) -> f32 {
    (line_height(style) - style.font_size) / 2.0 + style.font_size * ASCENT_EM
}

/// Break spans into lines no wider than `max_width`
///
/// Breaks follow UAX #14; a word wider than the line is left to overflow.
/// The result always has at least one line.
pub fn break_lines(spans: &[TextSpan], style: &TextStyle, max_width: f32) -> Vec<TextLine> {
    let texts: Vec<String> = spans.iter().map(|s| display_text(s, style)).collect();
    let full: String = texts.concat();

    // Byte offset where each span starts in `full`
    let mut span_starts = Vec::with_capacity(texts.len());
    let mut offset = 0;
    for text in &texts {
        span_starts.push(offset);
        offset += text.len();
    }
    let span_at = |pos: usize| span_starts.iter().rposition(|&start| start <= pos).unwrap_or(0);

    let mut lines = Vec::new();
    let mut line = TextLine::default();
    let mut line_width = 0.0f32;
    let mut seg_start = 0;

    for (brk, opportunity) in linebreaks(&full) {
        let segment = &full[seg_start..brk];
        let visible = segment.trim_end_matches([' ', '\n']);

        let visible_width = pieces(seg_start, visible, &span_starts, &span_at)
            .map(|(span, text)| run_width(text, span, style, spans))
            .sum::<f32>();
        let full_width = pieces(seg_start, segment, &span_starts, &span_at)
            .map(|(span, text)| run_width(text, span, style, spans))
            .sum::<f32>();

        if !line.runs.is_empty() && line_width + visible_width > max_width {
            lines.push(std::mem::take(&mut line).finish(style, spans));
            line_width = 0.0;
        }
        for (span, text) in pieces(seg_start, segment, &span_starts, &span_at) {
            line.push(text, span);
        }
        line_width += full_width;

        if opportunity == BreakOpportunity::Mandatory && brk < full.len() {
            lines.push(std::mem::take(&mut line).finish(style, spans));
            line_width = 0.0;
        }
        seg_start = brk;
    }

    if !line.runs.is_empty() || lines.is_empty() {
        lines.push(line.finish(style, spans));
    }
    lines
}

/// Split `text` (starting at byte `base` of the full string) at span boundaries
fn pieces<'a>(
    base: usize,
    text: &'a str,
    span_starts: &'a [usize],
    span_at: &'a impl Fn(usize) -> usize,
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    let end = base + text.len();
    let mut cursor = base;
    std::iter::from_fn(move || {
        if cursor >= end {
            return None;
        }
        let span = span_at(cursor);
        let next = span_starts
            .get(span + 1)
            .copied()
            .filter(|&s| s < end)
            .unwrap_or(end);
        let piece = &text[cursor - base..next - base];
        cursor = next;
        Some((span, piece))
    })
}

/// Widest hard line when nothing wraps
pub fn max_content_width(spans: &[TextSpan], style: &TextStyle) -> f32 {
    break_lines(spans, style, f32::INFINITY)
        .iter()
        .map(|l| l.width)
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle::sized(10.0)
    }

    #[test]
    fn test_single_line_fits() {
        let spans = vec![TextSpan::plain("hello world")];
        let lines = break_lines(&spans, &style(), 1000.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "hello world");
    }

    #[test]
    fn test_wraps_at_spaces() {
        let spans = vec![TextSpan::plain("alpha beta alpha beta")];
        let width = text_width("alpha beta", 10.0, false, 0.0) + 1.0;
        let lines = break_lines(&spans, &style(), width);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "alpha beta");
        assert_eq!(lines[1].text(), "alpha beta");
        assert!(lines.iter().all(|l| l.width <= width));
    }

    #[test]
    fn test_hard_breaks() {
        let spans = vec![TextSpan::plain("one\ntwo\n\nfour")];
        let lines = break_lines(&spans, &style(), 1000.0);
        let texts: Vec<String> = lines.iter().map(TextLine::text).collect();
        assert_eq!(texts, vec!["one", "two", "", "four"]);
    }

    #[test]
    fn test_spans_kept_on_line() {
        let spans = vec![
            TextSpan::plain("At "),
            TextSpan {
                text: "Acme".to_string(),
                bold: true,
                ..Default::default()
            },
            TextSpan::plain(" we"),
        ];
        let lines = break_lines(&spans, &style(), 1000.0);
        assert_eq!(lines.len(), 1);
        let runs = &lines[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text, "Acme");
        assert_eq!(runs[1].span, 1);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let lines = break_lines(&[], &style(), 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 0.0);
    }

    #[test]
    fn test_overlong_word_overflows() {
        let spans = vec![TextSpan::plain("supercalifragilistic")];
        let lines = break_lines(&spans, &style(), 20.0);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_uppercase_and_bold_measure_wider() {
        let plain = text_width("acme", 10.0, false, 0.0);
        assert!(text_width("acme", 10.0, true, 0.0) > plain);
        let spans = vec![TextSpan::plain("acme")];
        let upper = max_content_width(&spans, &TextStyle::sized(10.0).uppercase());
        assert!(upper > plain);
    }
}
