use super::pixel::{Pixel, Rect, PIXEL_SIZE};

// ============================================================================
// PixelBuffer
// ============================================================================

/// 32-bit image buffer in native (blue-first) channel order.
///
/// Pixels are stored row-major; `pixels.len() == width * height` holds after
/// every public operation. The buffer exclusively owns its storage; other
/// buffers are only ever borrowed as sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<Pixel>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Empty 0x0 buffer
    pub const fn new() -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Allocate a zero-filled (transparent black) buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![Pixel::TRANSPARENT; pixel_count(width, height)],
            width,
            height,
        }
    }

    /// Allocate and copy `width * height` pixels from `data`.
    /// Returns None if `data` holds fewer pixels than that.
    pub fn from_pixels(width: u32, height: u32, data: &[Pixel]) -> Option<Self> {
        let count = pixel_count(width, height);
        let data = data.get(..count)?;
        Some(Self {
            pixels: data.to_vec(),
            width,
            height,
        })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Storage size in bytes, always `width * height * 4`
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * PIXEL_SIZE
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Read a pixel. Caller guarantees `x < width` and `y < height`;
    /// violating that panics instead of reading foreign memory.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        debug_assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of range");
        self.pixels[self.pixel_index(x, y)]
    }

    /// Mutable access to one pixel, same contract as `pixel`
    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Pixel {
        debug_assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of range");
        let idx = self.pixel_index(x, y);
        &mut self.pixels[idx]
    }

    /// Write a pixel, same contract as `pixel`
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: Pixel) {
        *self.pixel_mut(x, y) = value;
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// One row of pixels
    #[inline]
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.pixel_index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Raw bytes in native order, for device upload
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    /// Reallocate to a new size. Contents are reset to transparent black.
    pub(crate) fn reset_to(&mut self, width: u32, height: u32) {
        self.pixels.clear();
        self.pixels
            .resize(pixel_count(width, height), Pixel::TRANSPARENT);
        self.width = width;
        self.height = height;
    }

    // ========================================================================
    // Fills
    // ========================================================================

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    /// Fill the part of `area` that lies inside the buffer.
    /// Areas partly or fully outside are clipped; nothing outside is touched.
    pub fn fill_area(&mut self, color: Pixel, area: Rect) {
        let Some((x0, y0, x1, y1)) = area.clip_to(self.width, self.height) else {
            return;
        };
        for y in y0..y1 {
            let start = self.pixel_index(x0, y);
            let end = self.pixel_index(x1, y);
            self.pixels[start..end].fill(color);
        }
    }

    // ========================================================================
    // Channel order
    // ========================================================================

    /// Swap channel 0 and channel 2 of every pixel (native <-> codec order).
    /// With `keep_alpha == false` every pixel is also forced fully opaque.
    pub fn flip_channels(&mut self, keep_alpha: bool) {
        for p in &mut self.pixels {
            p.swap_red_blue();
            if !keep_alpha {
                p.alpha = 255;
            }
        }
    }
}

#[inline]
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
