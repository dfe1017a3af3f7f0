//! Content produced by acquisition and consumed by summarization.

use std::fmt;

use crate::error::AcquisitionError;

/// Output of exactly one acquisition strategy for one locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquiredContent {
    Text(String),
    Image(ImageContent),
}

impl AcquiredContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Image encodings accepted by the providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Short name as used by the Bedrock image block.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// Detect the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated image: known format, readable header, original bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageContent {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageContent")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageContent {
    /// Validate encoded image bytes and read their pixel dimensions.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, AcquisitionError> {
        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| AcquisitionError::unsupported("not a PNG or JPEG image"))?;

        let (width, height) = match format {
            ImageFormat::Png => png_dimensions(&bytes),
            ImageFormat::Jpeg => jpeg_dimensions(&bytes),
        }
        .ok_or_else(|| AcquisitionError::unsupported(format!("truncated or corrupt {} header", format)))?;

        if width == 0 || height == 0 {
            return Err(AcquisitionError::unsupported(format!("{} has zero-sized dimensions", format)));
        }

        Ok(Self {
            format,
            width,
            height,
            bytes,
        })
    }

    /// Base64 of the encoded bytes.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    bytes.get(at..at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

// IHDR is always the first chunk: 8 byte signature, 4 length, 4 type, then width/height.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((read_u32(bytes, 16)?, read_u32(bytes, 20)?))
}

// Walk marker segments until a start-of-frame.
fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    loop {
        while *bytes.get(i)? == 0xFF {
            i += 1;
        }
        let marker = *bytes.get(i)?;
        i += 1;

        match marker {
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let length = read_u16(bytes, i)? as usize;
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let height = read_u16(bytes, i + 3)? as u32;
            let width = read_u16(bytes, i + 5)? as u32;
            return Some((width, height));
        }
        if length < 2 {
            return None;
        }
        i += length;
    }
}
