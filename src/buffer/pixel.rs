use bytemuck::{Pod, Zeroable};

/// Bytes per pixel in every buffer and every block transfer
pub const PIXEL_SIZE: usize = 4;

/// One 32-bit pixel in native channel order (blue, green, red, alpha).
///
/// The layout matches the firmware block-transfer pixel, so a `[Pixel]` slice
/// can be handed to a display device as-is. Codecs work in red-first order;
/// see `PixelBuffer::flip_channels`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Pixel {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub alpha: u8,
}

impl Pixel {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Build a pixel from channels listed in red-first order
    #[inline]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            blue,
            green,
            red,
            alpha,
        }
    }

    /// Build a pixel from channels listed in native (blue-first) order
    #[inline]
    pub const fn bgra(blue: u8, green: u8, red: u8, alpha: u8) -> Self {
        Self {
            blue,
            green,
            red,
            alpha,
        }
    }

    /// Opaque pixel from red, green, blue
    #[inline]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    /// Swap the first and third channel in place
    #[inline]
    pub fn swap_red_blue(&mut self) {
        std::mem::swap(&mut self.blue, &mut self.red);
    }
}

impl From<[u8; 4]> for Pixel {
    /// `[r, g, b, a]`, the order used in config files
    fn from(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Pixel> for [u8; 4] {
    fn from(p: Pixel) -> Self {
        [p.red, p.green, p.blue, p.alpha]
    }
}

/// Rectangle in buffer or device coordinates. Only a parameter object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with `[0, width) x [0, height)`.
    /// Returns `(x0, y0, x1, y1)` as exclusive bounds, or `None` if nothing overlaps.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.width)).min(i64::from(width));
        let y1 = (i64::from(self.y) + i64::from(self.height)).min(i64::from(height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_is_four_bytes_blue_first() {
        let p = Pixel::rgba(1, 2, 3, 4);
        assert_eq!(std::mem::size_of::<Pixel>(), PIXEL_SIZE);
        assert_eq!(bytemuck::bytes_of(&p), &[3, 2, 1, 4]);
    }

    #[test]
    fn test_swap_red_blue() {
        let mut p = Pixel::rgba(10, 20, 30, 40);
        p.swap_red_blue();
        assert_eq!(p, Pixel::rgba(30, 20, 10, 40));
    }

    #[test]
    fn test_array_conversion_is_red_first() {
        let p: Pixel = [200, 100, 50, 25].into();
        assert_eq!(p.red, 200);
        assert_eq!(p.blue, 50);
        assert_eq!(<[u8; 4]>::from(p), [200, 100, 50, 25]);
    }

    #[test]
    fn test_rect_clip() {
        let r = Rect::new(-2, 1, 5, 10);
        assert_eq!(r.clip_to(4, 4), Some((0, 1, 3, 4)));
        assert_eq!(Rect::new(4, 0, 2, 2).clip_to(4, 4), None);
        assert_eq!(Rect::new(-5, -5, 3, 3).clip_to(4, 4), None);
        assert_eq!(Rect::new(0, 0, 0, 3).clip_to(4, 4), None);
        assert_eq!(Rect::new(i32::MAX, 0, u32::MAX, 1).clip_to(4, 4), None);
    }
}
