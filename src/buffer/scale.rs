//! Edge-aware smoothing resampler.
//!
//! Each destination pixel blends a five-tap stencil (center plus the four
//! axis neighbours) of the source pixel it maps to. Side taps are weighted by
//! how far the destination pixel sits inside the scaled source cell, so the
//! filter leans toward the neighbour it is approaching. Alpha is never
//! filtered; it is copied from the center tap.

use super::pixel::Pixel;
use super::pixel_buffer::PixelBuffer;

/// Scales below this are treated as degenerate and skip resampling
pub const MIN_SCALE: f32 = 1.0e-4;

impl PixelBuffer {
    /// Create a smoothed copy of `source` scaled by `scale` on both axes.
    ///
    /// The result is `floor(w * scale) x floor(h * scale)`. A `scale` below
    /// [`MIN_SCALE`] (including NaN and negatives) yields that size zero-filled.
    pub fn scaled(source: &Self, scale: f32) -> Self {
        let width = scaled_dim(source.width(), scale);
        let height = scaled_dim(source.height(), scale);
        let mut out = Self::with_size(width, height);
        if is_degenerate(scale) {
            log::warn!("scale {scale} below {MIN_SCALE}, leaving {width}x{height} buffer blank");
            return out;
        }
        out.copy_scaled(source, scale);
        out
    }

    /// Resample `source` into this buffer, which the caller has already sized.
    /// Destination pixel `(x, y)` reads the source cell `floor(x / scale)`.
    pub fn copy_scaled(&mut self, source: &Self, scale: f32) {
        let src_w = source.width();
        let src_h = source.height();
        if src_w == 0 || src_h == 0 || is_degenerate(scale) {
            return;
        }

        let dst_w = self.width();
        let dst_h = self.height();
        for y in 0..dst_h {
            let (ly, dy) = anchor(y, scale, src_h);
            for x in 0..dst_w {
                let (lx, dx) = anchor(x, scale, src_w);

                let center = source.pixel(lx, ly);
                let left = if lx > 0 { source.pixel(lx - 1, ly) } else { center };
                let top = if ly > 0 { source.pixel(lx, ly - 1) } else { center };
                let right = if lx + 1 < src_w { source.pixel(lx + 1, ly) } else { center };
                let bottom = if ly + 1 < src_h { source.pixel(lx, ly + 1) } else { center };

                let stencil = Stencil {
                    center,
                    left,
                    top,
                    right,
                    bottom,
                    dx,
                    dy,
                    scale,
                };
                self.set_pixel(
                    x,
                    y,
                    Pixel {
                        blue: stencil.smooth(|p| p.blue),
                        green: stencil.smooth(|p| p.green),
                        red: stencil.smooth(|p| p.red),
                        alpha: center.alpha,
                    },
                );
            }
        }
    }
}

/// Too small to resample; NaN is checked explicitly since it fails every comparison
#[inline]
fn is_degenerate(scale: f32) -> bool {
    scale.is_nan() || scale < MIN_SCALE
}

/// Destination size along one axis, truncated toward zero.
/// Float-to-int `as` saturates: NaN and negatives give 0, huge scales cap.
#[inline]
fn scaled_dim(src: u32, scale: f32) -> u32 {
    (src as f32 * scale) as u32
}

/// Source coordinate and residue for destination coordinate `d`.
/// The residue is `d - l * scale` truncated toward zero, so `0 <= residue < scale`
/// and the side weights never go negative.
#[inline]
fn anchor(d: u32, scale: f32, src_dim: u32) -> (u32, f32) {
    let l = ((d as f32 / scale) as u32).min(src_dim - 1);
    let residue = (d as f32 - l as f32 * scale) as i32 as f32;
    (l, residue)
}

struct Stencil {
    center: Pixel,
    left: Pixel,
    top: Pixel,
    right: Pixel,
    bottom: Pixel,
    dx: f32,
    dy: f32,
    scale: f32,
}

impl Stencil {
    /// Weights sum to `8 * scale`, so uniform input passes through unchanged
    #[inline]
    fn smooth(&self, channel: impl Fn(&Pixel) -> u8) -> u8 {
        let s = self.scale;
        let c = |p: &Pixel| f32::from(channel(p));
        let sum = c(&self.left) * (s - self.dx) * 3.0
            + c(&self.top) * (s - self.dy) * 3.0
            + c(&self.right) * self.dx * 3.0
            + c(&self.bottom) * self.dy * 3.0
            + c(&self.center) * 2.0 * s;
        (sum / (s * 8.0)) as u8
    }
}
