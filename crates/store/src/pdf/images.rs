//! Image XObjects
//!
//! Captures arrive as packed 8-bit RGB and are embedded Flate-compressed.

use super::objects::{PdfDictionary, PdfObject, PdfStream};
use super::writer::{deflate, PdfError, Result};

/// Color space of an embedded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }

    pub fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
        }
    }
}

/// Pixel data ready to become an image XObject
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub data: Vec<u8>,
    /// `data` holds Flate-encoded samples
    pub compressed: bool,
}

impl ImageData {
    /// Wrap packed 8-bit RGB, checking the buffer against the dimensions
    pub fn from_raw_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        Self::from_raw(data, width, height, ColorSpace::DeviceRGB)
    }

    pub fn from_raw_gray(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        Self::from_raw(data, width, height, ColorSpace::DeviceGray)
    }

    fn from_raw(data: Vec<u8>, width: u32, height: u32, color_space: ColorSpace) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PdfError::InvalidImage(format!("empty image {}x{}", width, height)));
        }
        let expected = width as usize * height as usize * color_space.components();
        if data.len() != expected {
            return Err(PdfError::InvalidImage(format!(
                "{}x{} {} needs {} bytes, got {}",
                width,
                height,
                color_space.pdf_name(),
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            color_space,
            data,
            compressed: false,
        })
    }

    /// Flate-encode the samples in place
    pub fn compress(&mut self) -> Result<()> {
        if !self.compressed {
            self.data = deflate(&self.data)?;
            self.compressed = true;
        }
        Ok(())
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Image XObject stream
    pub fn to_xobject(&self) -> PdfStream {
        let dict = PdfDictionary::typed("XObject")
            .with("Subtype", PdfObject::name("Image"))
            .with("Width", self.width)
            .with("Height", self.height)
            .with("ColorSpace", PdfObject::name(self.color_space.pdf_name()))
            .with("BitsPerComponent", 8i64);
        let stream = PdfStream::new(dict, self.data.clone());
        if self.compressed {
            stream.precompressed()
        } else {
            stream
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_rgb_size_is_checked() {
        assert!(ImageData::from_raw_rgb(vec![0; 12], 2, 2).is_ok());
        assert!(matches!(
            ImageData::from_raw_rgb(vec![0; 11], 2, 2),
            Err(PdfError::InvalidImage(_))
        ));
        assert!(ImageData::from_raw_rgb(Vec::new(), 0, 5).is_err());
    }

    #[test]
    fn test_xobject_dictionary() {
        let mut image = ImageData::from_raw_rgb(vec![255; 3 * 4 * 2], 4, 2).unwrap();
        image.compress().unwrap();
        let stream = image.to_xobject();
        assert!(stream.compressed);
        assert_eq!(stream.dict.get("Width"), Some(&PdfObject::Integer(4)));
        assert_eq!(stream.dict.get("ColorSpace"), Some(&PdfObject::name("DeviceRGB")));
    }
}
