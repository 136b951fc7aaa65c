use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use crate::error::PhotoError;
use crate::ports::ImageCodec;

const DEFAULT_QUALITY: u8 = 90;

/// Decodes any format the `image` crate understands and writes baseline JPEG.
///
/// Alpha is dropped; transparent regions come out as their stored colour.
#[derive(Debug, Clone, Copy)]
pub struct JpegReencoder {
    quality: u8,
}

impl JpegReencoder {
    /// `quality` is clamped to 1..=100.
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegReencoder {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl ImageCodec for JpegReencoder {
    fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, PhotoError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality).encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ColorType::Rgb8,
        )?;
        Ok(out)
    }
}
