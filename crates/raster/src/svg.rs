//! Painting a layout as an SVG document

use base64::{engine::general_purpose::STANDARD, Engine};
use doc_model::FontFamily;
use quick_xml::escape::escape;
use render_model::{Border, Color, ImageSource, Layout, Primitive, Rect, TextAlign, TextPrimitive};
use std::fmt::Write;

/// Font stack for each family choice
pub fn font_stack(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Sans => "Inter, Helvetica, Arial, sans-serif",
        FontFamily::Serif => "'Playfair Display', Georgia, 'Times New Roman', serif",
        FontFamily::Display => "Outfit, Helvetica, Arial, sans-serif",
        FontFamily::Grotesk => "'Space Grotesk', Helvetica, Arial, sans-serif",
    }
}

/// Format a coordinate with at most three decimals
fn num(v: f32) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn paint(color: Color) -> String {
    if color.is_opaque() {
        format!("\"{}\"", color.to_hex())
    } else {
        format!("\"{}\" fill-opacity=\"{}\"", color.to_hex(), num(color.opacity()))
    }
}

fn stroke(border: &Border) -> String {
    let mut out = format!(
        "stroke=\"{}\" stroke-width=\"{}\"",
        border.color.to_hex(),
        num(border.width)
    );
    if !border.color.is_opaque() {
        let _ = write!(out, " stroke-opacity=\"{}\"", num(border.color.opacity()));
    }
    if border.dashed {
        let _ = write!(out, " stroke-dasharray=\"{} {}\"", num(border.width * 3.0), num(border.width * 2.0));
    }
    out
}

fn rect_attrs(rect: &Rect, radius: f32) -> String {
    let mut out = format!(
        "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        num(rect.x),
        num(rect.y),
        num(rect.width),
        num(rect.height)
    );
    if radius > 0.0 {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
        let _ = write!(out, " rx=\"{}\"", num(r));
    }
    out
}

fn write_text(out: &mut String, text: &TextPrimitive) {
    let anchor = match text.anchor {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    };
    let _ = write!(
        out,
        "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" text-anchor=\"{}\" xml:space=\"preserve\"",
        num(text.x),
        num(text.baseline),
        escape(font_stack(text.family)),
        num(text.font_size),
        anchor
    );
    if text.letter_spacing != 0.0 {
        let _ = write!(out, " letter-spacing=\"{}\"", num(text.letter_spacing * text.font_size));
    }
    out.push('>');
    for run in &text.runs {
        let _ = write!(out, "<tspan fill={}", paint(run.color));
        if run.bold {
            out.push_str(" font-weight=\"bold\"");
        }
        if run.italic {
            out.push_str(" font-style=\"italic\"");
        }
        if run.underline {
            out.push_str(" text-decoration=\"underline\"");
        }
        let _ = write!(out, ">{}</tspan>", escape(run.text.as_str()));
    }
    out.push_str("</text>\n");
}

/// Serialize a layout as a standalone SVG document of its visual size
///
/// Remote images are skipped; callers that need every pixel check
/// [`Layout::remote_images`] first.
pub fn to_svg(layout: &Layout) -> String {
    let mut out = String::with_capacity(4096 + layout.primitives.len() * 160);
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = num(layout.width),
        h = num(layout.height)
    );
    if layout.scale != 1.0 {
        let _ = writeln!(out, "<g transform=\"scale({})\">", layout.scale);
    } else {
        out.push_str("<g>\n");
    }

    for primitive in &layout.primitives {
        match primitive {
            Primitive::Fill { rect, color, radius } => {
                let _ = writeln!(out, "<rect {} fill={}/>", rect_attrs(rect, *radius), paint(*color));
            }
            Primitive::Stroke { rect, border, radius } => {
                let _ = writeln!(
                    out,
                    "<rect {} fill=\"none\" {}/>",
                    rect_attrs(rect, *radius),
                    stroke(border)
                );
            }
            Primitive::Line { x1, y1, x2, y2, border } => {
                let _ = writeln!(
                    out,
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {}/>",
                    num(*x1),
                    num(*y1),
                    num(*x2),
                    num(*y2),
                    stroke(border)
                );
            }
            Primitive::Text(text) => write_text(&mut out, text),
            Primitive::Image { rect, source } => {
                if let ImageSource::Embedded { mime_type, bytes, .. } = source {
                    let _ = writeln!(
                        out,
                        "<image {} preserveAspectRatio=\"none\" xlink:href=\"data:{};base64,{}\"/>",
                        rect_attrs(rect, 0.0),
                        escape(mime_type.as_str()),
                        STANDARD.encode(bytes)
                    );
                }
            }
        }
    }

    out.push_str("</g>\n</svg>\n");
    out
}
