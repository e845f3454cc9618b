//! Low-level PDF file writer
//!
//! Tracks byte offsets while objects are appended so the cross-reference
//! table and trailer can be emitted at the end.

use super::document::PdfVersion;
use super::objects::{PdfDictionary, PdfObject, PdfStream};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Write};
use thiserror::Error;

/// Errors raised while assembling or writing a PDF
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Compression error: {0}")]
    Compression(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Appends numbered objects to a byte sink
pub struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    /// Byte offset per object number; index 0 is the free-list head
    offsets: Vec<Option<u64>>,
    version: PdfVersion,
    compress: bool,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W, version: PdfVersion) -> Self {
        Self {
            writer,
            position: 0,
            offsets: vec![None],
            version,
            compress: true,
        }
    }

    /// Flate-encode streams that are not already compressed
    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    /// Reserve the next object number
    pub fn allocate(&mut self) -> u32 {
        self.offsets.push(None);
        (self.offsets.len() - 1) as u32
    }

    fn emit(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn begin_object(&mut self, id: u32) -> Result<()> {
        let slot = self
            .offsets
            .get_mut(id as usize)
            .ok_or_else(|| PdfError::InvalidDocument(format!("object {} was never allocated", id)))?;
        if slot.is_some() {
            return Err(PdfError::InvalidDocument(format!("object {} written twice", id)));
        }
        *slot = Some(self.position);
        self.emit(format!("{} 0 obj\n", id).as_bytes())
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.emit(format!("%PDF-{}\n", self.version.as_str()).as_bytes())?;
        // Binary marker so transports treat the file as binary
        self.emit(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])
    }

    pub fn write_object(&mut self, id: u32, object: &PdfObject) -> Result<()> {
        self.begin_object(id)?;
        self.emit(&object.to_bytes())?;
        self.emit(b"\nendobj\n")
    }

    pub fn write_stream(&mut self, id: u32, stream: PdfStream) -> Result<()> {
        let PdfStream {
            mut dict,
            mut data,
            compressed,
        } = stream;
        if compressed {
            dict.insert("Filter", PdfObject::name("FlateDecode"));
        } else if self.compress {
            data = deflate(&data)?;
            dict.insert("Filter", PdfObject::name("FlateDecode"));
        }
        dict.insert("Length", data.len());

        self.begin_object(id)?;
        self.emit(&PdfObject::from(dict).to_bytes())?;
        self.emit(b"\nstream\n")?;
        self.emit(&data)?;
        self.emit(b"\nendstream\nendobj\n")
    }

    /// Emit the xref table and trailer, returning the sink
    pub fn finish(mut self, root: u32, info: Option<u32>) -> Result<W> {
        if let Some(missing) = self.offsets.iter().skip(1).position(Option::is_none) {
            return Err(PdfError::InvalidDocument(format!(
                "object {} allocated but not written",
                missing + 1
            )));
        }

        let xref_offset = self.position;
        let count = self.offsets.len();
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", count);
        for offset in self.offsets.iter().skip(1).flatten() {
            table.push_str(&format!("{:010} 00000 n \n", offset));
        }
        self.emit(table.as_bytes())?;

        let mut trailer = PdfDictionary::new()
            .with("Size", count)
            .with("Root", PdfObject::reference(root));
        if let Some(info) = info {
            trailer.insert("Info", PdfObject::reference(info));
        }
        self.emit(b"trailer\n")?;
        self.emit(&PdfObject::from(trailer).to_bytes())?;
        self.emit(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes())?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Zlib-wrapped deflate, as `/FlateDecode` expects
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PdfError::Compression(e.to_string()))?;
    encoder.finish().map_err(|e| PdfError::Compression(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_structure() {
        let mut writer = PdfWriter::new(Vec::new(), PdfVersion::V1_4);
        writer.write_header().unwrap();
        let catalog = writer.allocate();
        writer
            .write_object(catalog, &PdfDictionary::typed("Catalog").into())
            .unwrap();
        let bytes = writer.finish(catalog, None).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("1 0 obj\n<< /Type /Catalog >>\nendobj"));
        assert!(text.contains("xref\n0 2\n0000000000 65535 f \n0000000015 00000 n \n"));
        assert!(text.contains("/Root 1 0 R"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_stream_length_and_filter() {
        let mut writer = PdfWriter::new(Vec::new(), PdfVersion::V1_4);
        writer.set_compression(false);
        writer.write_header().unwrap();
        let id = writer.allocate();
        writer
            .write_stream(id, PdfStream::new(PdfDictionary::new(), b"q Q".to_vec()))
            .unwrap();
        let bytes = writer.finish(id, None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("<< /Length 3 >>\nstream\nq Q\nendstream"));
        assert!(!text.contains("FlateDecode"));
    }

    #[test]
    fn test_unwritten_object_is_rejected() {
        let mut writer = PdfWriter::new(Vec::new(), PdfVersion::V1_4);
        writer.write_header().unwrap();
        let catalog = writer.allocate();
        let _orphan = writer.allocate();
        writer
            .write_object(catalog, &PdfDictionary::typed("Catalog").into())
            .unwrap();
        assert!(matches!(
            writer.finish(catalog, None),
            Err(PdfError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_double_write_is_rejected() {
        let mut writer = PdfWriter::new(Vec::new(), PdfVersion::V1_4);
        let id = writer.allocate();
        writer.write_object(id, &PdfObject::Null).unwrap();
        assert!(writer.write_object(id, &PdfObject::Null).is_err());
    }
}
