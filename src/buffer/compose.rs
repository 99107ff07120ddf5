use super::pixel::Pixel;
use super::pixel_buffer::PixelBuffer;

/// Unpremultiplied "over" for one color channel, truncating
#[inline]
fn over_channel(base: u8, top: u8, top_alpha: u32, rev_alpha: u32) -> u8 {
    ((u32::from(base) * rev_alpha + u32::from(top) * top_alpha) / 255) as u8
}

/// Combined coverage of two layers: `1 - (1 - top) * (1 - base)`
#[inline]
fn over_alpha(base_alpha: u8, rev_alpha: u32) -> u8 {
    ((255 * 255 - rev_alpha * (255 - u32::from(base_alpha))) / 255) as u8
}

impl PixelBuffer {
    /// Alpha-blend `top` onto this buffer with its origin at `(pos_x, pos_y)`.
    ///
    /// Only the overlap of the two buffers is visited; negative offsets clip the
    /// top image. When `base_is_opaque` is set this buffer is treated as an opaque
    /// backdrop and every touched pixel ends fully opaque; otherwise the result
    /// alpha combines both layers.
    pub fn compose(&mut self, pos_x: i32, pos_y: i32, top: &Self, base_is_opaque: bool) {
        let Some((x0, y0, x1, y1)) = overlap(self, pos_x, pos_y, top) else {
            return;
        };

        for y in y0..y1 {
            let ty = (i64::from(y) - i64::from(pos_y)) as u32;
            for x in x0..x1 {
                let tx = (i64::from(x) - i64::from(pos_x)) as u32;
                let src = top.pixel(tx, ty);
                let dst = self.pixel_mut(x, y);

                let top_alpha = u32::from(src.alpha);
                let rev_alpha = 255 - top_alpha;
                *dst = Pixel {
                    blue: over_channel(dst.blue, src.blue, top_alpha, rev_alpha),
                    green: over_channel(dst.green, src.green, top_alpha, rev_alpha),
                    red: over_channel(dst.red, src.red, top_alpha, rev_alpha),
                    alpha: if base_is_opaque {
                        255
                    } else {
                        over_alpha(dst.alpha, rev_alpha)
                    },
                };
            }
        }
    }
}

/// Overlap of `top` at `(pos_x, pos_y)` with `base`, in base coordinates.
/// Returns exclusive bounds `(x0, y0, x1, y1)`.
fn overlap(
    base: &PixelBuffer,
    pos_x: i32,
    pos_y: i32,
    top: &PixelBuffer,
) -> Option<(u32, u32, u32, u32)> {
    let x0 = i64::from(pos_x).max(0);
    let y0 = i64::from(pos_y).max(0);
    let x1 = (i64::from(pos_x) + i64::from(top.width())).min(i64::from(base.width()));
    let y1 = (i64::from(pos_y) + i64::from(top.height())).min(i64::from(base.height()));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}
