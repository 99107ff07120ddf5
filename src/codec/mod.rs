//! Codec boundary and channel-order adapter.
//!
//! Codecs speak red-first RGBA bytes; buffers are blue-first. Everything that
//! crosses the boundary goes through `PixelBuffer::decode`, `PixelBuffer::encode`
//! or `PixelBuffer::rasterize_vector`, which do the reordering.

#[cfg(feature = "png")]
mod png;
#[cfg(feature = "svg")]
mod svg;

#[cfg(feature = "png")]
pub use self::png::PngCodec;
#[cfg(feature = "svg")]
pub use self::svg::{SvgCodec, SvgScene};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::{Pixel, PixelBuffer, PIXEL_SIZE};

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("pixel data holds {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl CodecError {
    /// Numeric failure code for callers that report status numbers. Never 0.
    pub const fn code(&self) -> u32 {
        match self {
            Self::Decode(_) => 1,
            Self::Encode(_) => 2,
            Self::SizeMismatch { .. } => 3,
        }
    }
}

// ============================================================================
// Codec traits
// ============================================================================

/// Decoded raster image, RGBA bytes in red-first order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Raster (bitmap) codec working on straight RGBA bytes
pub trait RasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError>;
    fn encode(&self, rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CodecError>;
}

pub trait VectorScene {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
}

/// Vector-graphics parser and rasterizer
pub trait VectorCodec {
    type Scene: VectorScene;

    /// `None` for absent or malformed input
    fn parse(&self, text: &str) -> Option<Self::Scene>;

    /// Render `scene` into `dest` as straight RGBA rows `stride` bytes apart.
    /// `dest` arrives cleared to transparent black; the covered area is
    /// overwritten, not blended, and the rest may be left alone.
    fn rasterize(
        &self,
        scene: &Self::Scene,
        origin_x: f32,
        origin_y: f32,
        scale_x: f32,
        scale_y: f32,
        dest: &mut [u8],
        dest_width: u32,
        dest_height: u32,
        stride: usize,
    );
}

/// What happens to alpha when a buffer is handed to an encoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaPolicy {
    /// Force every pixel fully opaque
    #[default]
    Opaque,
    /// Keep per-pixel alpha
    Preserve,
}

// ============================================================================
// Channel adapter
// ============================================================================

impl PixelBuffer {
    /// Decode `bytes` with `codec` into a buffer in native channel order.
    /// Alpha from the codec is kept.
    pub fn decode(codec: &impl RasterCodec, bytes: &[u8]) -> Result<Self, CodecError> {
        let image = codec.decode(bytes)?;
        let expected = image.width as usize * image.height as usize * PIXEL_SIZE;
        let data = image.rgba.get(..expected).ok_or(CodecError::SizeMismatch {
            expected,
            actual: image.rgba.len(),
        })?;

        let pixels: &[Pixel] = bytemuck::cast_slice(data);
        let mut buf = Self::from_pixels(image.width, image.height, pixels).ok_or(
            CodecError::SizeMismatch {
                expected,
                actual: data.len(),
            },
        )?;
        buf.flip_channels(true);
        log::debug!("decoded {}x{} image", buf.width(), buf.height());
        Ok(buf)
    }

    /// Encode this buffer with `codec`. Channels are reordered on a scratch copy,
    /// so `self` is left in native order.
    pub fn encode(&self, codec: &impl RasterCodec, alpha: AlphaPolicy) -> Result<Vec<u8>, CodecError> {
        let mut scratch = self.clone();
        scratch.flip_channels(alpha == AlphaPolicy::Preserve);
        codec.encode(scratch.as_bytes(), self.width(), self.height())
    }

    /// Rasterize vector `text` into this buffer, fitted to its current size.
    ///
    /// The scene is scaled uniformly by `min(w / scene_w, h / scene_h) * extra_scale`
    /// and drawn at the origin onto a buffer cleared to transparent black. Returns
    /// false, leaving the buffer untouched, when the scene is absent, malformed or
    /// has no area.
    pub fn rasterize_vector<C: VectorCodec>(&mut self, codec: &C, text: &str, extra_scale: f32) -> bool {
        let Some(scene) = codec.parse(text) else {
            log::debug!("vector input did not parse, buffer left as is");
            return false;
        };
        let (scene_w, scene_h) = (scene.width(), scene.height());
        if !(scene_w > 0.0 && scene_h > 0.0) || self.is_empty() {
            log::debug!("empty vector scene {scene_w}x{scene_h}, buffer left as is");
            return false;
        }

        let (width, height) = (self.width(), self.height());
        let scale_x = width as f32 / scene_w;
        let scale_y = height as f32 / scene_h;
        let scale = scale_x.min(scale_y) * extra_scale;
        log::debug!("rasterizing {scene_w}x{scene_h} scene into {width}x{height} at scale {scale}");

        let stride = width as usize * PIXEL_SIZE;
        self.fill(Pixel::TRANSPARENT);
        codec.rasterize(&scene, 0.0, 0.0, scale, scale, self.as_bytes_mut(), width, height, stride);
        self.flip_channels(true);
        true
    }
}
