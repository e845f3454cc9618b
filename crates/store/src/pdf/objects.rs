//! PDF object model
//!
//! The handful of object types an exported letter needs: scalars, names,
//! strings, arrays, dictionaries, streams and indirect references.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// A direct PDF object
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(String),
    Array(Vec<PdfObject>),
    Dictionary(PdfDictionary),
    /// Indirect reference (object number, generation)
    Reference(u32, u16),
}

/// String encodings
#[derive(Debug, Clone, PartialEq)]
pub enum PdfString {
    /// `( ... )` with escapes
    Literal(Vec<u8>),
    /// `< ... >`
    Hex(Vec<u8>),
}

impl PdfString {
    /// Text string for metadata
    ///
    /// Printable ASCII stays literal; anything else is written as UTF-16BE
    /// with a byte order mark so viewers decode it correctly.
    pub fn text(s: &str) -> Self {
        if s.bytes().all(|b| (0x20..0x7f).contains(&b)) {
            return PdfString::Literal(s.as_bytes().to_vec());
        }
        let mut bytes = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        PdfString::Hex(bytes)
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            PdfString::Literal(bytes) => {
                out.write_all(b"(")?;
                for &b in bytes {
                    match b {
                        b'(' | b')' | b'\\' => out.write_all(&[b'\\', b])?,
                        b'\n' => out.write_all(b"\\n")?,
                        b'\r' => out.write_all(b"\\r")?,
                        0x20..=0x7e => out.write_all(&[b])?,
                        _ => write!(out, "\\{:03o}", b)?,
                    }
                }
                out.write_all(b")")
            }
            PdfString::Hex(bytes) => {
                out.write_all(b"<")?;
                for b in bytes {
                    write!(out, "{:02X}", b)?;
                }
                out.write_all(b">")
            }
        }
    }
}

fn write_name<W: Write>(name: &str, out: &mut W) -> io::Result<()> {
    out.write_all(b"/")?;
    for b in name.bytes() {
        let delimiter = matches!(
            b,
            b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        );
        if (0x21..=0x7e).contains(&b) && !delimiter {
            out.write_all(&[b])?;
        } else {
            write!(out, "#{:02X}", b)?;
        }
    }
    Ok(())
}

/// Format a real without exponent or trailing zeros
pub fn format_real(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.4}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}

impl PdfObject {
    pub fn name(s: impl Into<String>) -> Self {
        PdfObject::Name(s.into())
    }

    pub fn text(s: &str) -> Self {
        PdfObject::String(PdfString::text(s))
    }

    pub fn reference(id: u32) -> Self {
        PdfObject::Reference(id, 0)
    }

    /// `[x0 y0 x1 y1]` from four reals
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Real(x0),
            PdfObject::Real(y0),
            PdfObject::Real(x1),
            PdfObject::Real(y1),
        ])
    }

    /// Serialize in PDF syntax
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            PdfObject::Null => out.write_all(b"null"),
            PdfObject::Boolean(b) => out.write_all(if *b { b"true" } else { b"false" }),
            PdfObject::Integer(n) => write!(out, "{}", n),
            PdfObject::Real(n) => out.write_all(format_real(*n).as_bytes()),
            PdfObject::String(s) => s.write_to(out),
            PdfObject::Name(name) => write_name(name, out),
            PdfObject::Array(items) => {
                out.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.write_all(b" ")?;
                    }
                    item.write_to(out)?;
                }
                out.write_all(b"]")
            }
            PdfObject::Dictionary(dict) => dict.write_to(out),
            PdfObject::Reference(id, generation) => write!(out, "{} {} R", id, generation),
        }
    }

    /// Serialized form as bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut out);
        out
    }
}

impl From<i64> for PdfObject {
    fn from(n: i64) -> Self {
        PdfObject::Integer(n)
    }
}

impl From<u32> for PdfObject {
    fn from(n: u32) -> Self {
        PdfObject::Integer(n as i64)
    }
}

impl From<usize> for PdfObject {
    fn from(n: usize) -> Self {
        PdfObject::Integer(n as i64)
    }
}

impl From<f64> for PdfObject {
    fn from(n: f64) -> Self {
        PdfObject::Real(n)
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

impl From<Vec<PdfObject>> for PdfObject {
    fn from(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }
}

/// Dictionary with deterministic key order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDictionary {
    entries: BTreeMap<String, PdfObject>,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary with `/Type` set
    pub fn typed(type_name: &str) -> Self {
        let mut dict = Self::new();
        dict.insert("Type", PdfObject::name(type_name));
        dict
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PdfObject>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PdfObject>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(b"<<")?;
        for (key, value) in &self.entries {
            out.write_all(b" ")?;
            write_name(key, out)?;
            out.write_all(b" ")?;
            value.write_to(out)?;
        }
        out.write_all(b" >>")
    }
}

/// Stream object: dictionary plus payload
///
/// `/Length` is filled in by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    pub data: Vec<u8>,
    /// Payload is already Flate-encoded
    pub compressed: bool,
}

impl PdfStream {
    pub fn new(dict: PdfDictionary, data: Vec<u8>) -> Self {
        Self {
            dict,
            data,
            compressed: false,
        }
    }

    pub fn precompressed(mut self) -> Self {
        self.compressed = true;
        self
    }
}
