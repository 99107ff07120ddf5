mod compose;
mod pixel;
mod pixel_buffer;
mod scale;

pub use pixel::{Pixel, Rect, PIXEL_SIZE};
pub use pixel_buffer::PixelBuffer;
pub use scale::MIN_SCALE;
