use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

use super::{CodecError, DecodedImage, RasterCodec};

/// PNG codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl RasterCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    fn encode(&self, rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CodecError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CodecError::SizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(rgba, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }
}
