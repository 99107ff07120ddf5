//! Software block transfer between a pixel slice and a linear framebuffer.

use super::{BltOperation, BltRegion, DeviceError};
use crate::buffer::{Pixel, PIXEL_SIZE};

/// Linear framebuffer in native pixel order
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::BLACK; width as usize * height as usize],
        }
    }

    /// Run one block transfer. `delta` is the framebuffer scanline pitch in bytes;
    /// the pixel slice in `op` is addressed by its own row width. Every row is
    /// bounds-checked on both sides before anything is copied.
    pub fn transfer(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError> {
        if region.width == 0 || region.height == 0 {
            return Ok(());
        }
        let pitch = delta / PIXEL_SIZE;
        let w = region.width as usize;
        let h = region.height as usize;

        let (video_x, video_y, buf_x, buf_y) = match op {
            BltOperation::VideoToBuffer { .. } => (region.src_x, region.src_y, region.dst_x, region.dst_y),
            BltOperation::BufferToVideo { .. } => (region.dst_x, region.dst_y, region.src_x, region.src_y),
        };
        self.check_video(video_x, video_y, region, pitch)?;

        match op {
            BltOperation::VideoToBuffer {
                buffer,
                buffer_width,
            } => {
                check_buffer(buffer.len(), buffer_width, buf_x, buf_y, region)?;
                for row in 0..h {
                    let v = (video_y as usize + row) * pitch + video_x as usize;
                    let b = (buf_y as usize + row) * buffer_width as usize + buf_x as usize;
                    buffer[b..b + w].copy_from_slice(&self.pixels[v..v + w]);
                }
            },
            BltOperation::BufferToVideo {
                buffer,
                buffer_width,
            } => {
                check_buffer(buffer.len(), buffer_width, buf_x, buf_y, region)?;
                for row in 0..h {
                    let v = (video_y as usize + row) * pitch + video_x as usize;
                    let b = (buf_y as usize + row) * buffer_width as usize + buf_x as usize;
                    self.pixels[v..v + w].copy_from_slice(&buffer[b..b + w]);
                }
            },
        }
        Ok(())
    }

    fn check_video(&self, x: u32, y: u32, region: BltRegion, pitch: usize) -> Result<(), DeviceError> {
        let out_of_bounds = DeviceError::OutOfBounds {
            width: self.width,
            height: self.height,
        };
        let right = u64::from(x) + u64::from(region.width);
        let bottom = u64::from(y) + u64::from(region.height);
        if right > u64::from(self.width) || bottom > u64::from(self.height) || pitch < right as usize {
            return Err(out_of_bounds);
        }
        let last = (bottom as usize - 1) * pitch + right as usize;
        if last > self.pixels.len() {
            return Err(out_of_bounds);
        }
        Ok(())
    }
}

fn check_buffer(len: usize, buffer_width: u32, x: u32, y: u32, region: BltRegion) -> Result<(), DeviceError> {
    let right = u64::from(x) + u64::from(region.width);
    let bottom = u64::from(y) + u64::from(region.height);
    let end = (bottom - 1) * u64::from(buffer_width) + right;
    if right > u64::from(buffer_width) || end > len as u64 {
        return Err(DeviceError::BufferTooSmall {
            len,
            needed: end as usize,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(src: (u32, u32), dst: (u32, u32), w: u32, h: u32) -> BltRegion {
        BltRegion {
            src_x: src.0,
            src_y: src.1,
            dst_x: dst.0,
            dst_y: dst.1,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_buffer_to_video_rows() {
        let mut fb = Framebuffer::new(4, 3);
        let src = vec![Pixel::WHITE; 4];
        let op = BltOperation::BufferToVideo {
            buffer: &src,
            buffer_width: 2,
        };
        fb.transfer(op, region((0, 0), (1, 1), 2, 2), 16).unwrap();
        let white: Vec<usize> = fb
            .pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == Pixel::WHITE)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(white, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_video_to_buffer_rows() {
        let mut fb = Framebuffer::new(3, 3);
        for (i, p) in fb.pixels.iter_mut().enumerate() {
            *p = Pixel::rgb(i as u8, 0, 0);
        }
        let mut dst = vec![Pixel::TRANSPARENT; 4];
        let op = BltOperation::VideoToBuffer {
            buffer: &mut dst,
            buffer_width: 2,
        };
        fb.transfer(op, region((1, 1), (0, 0), 2, 2), 12).unwrap();
        let reds: Vec<u8> = dst.iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![4, 5, 7, 8]);
    }

    #[test]
    fn test_rejects_video_overflow() {
        let mut fb = Framebuffer::new(2, 2);
        let src = vec![Pixel::WHITE; 9];
        let op = BltOperation::BufferToVideo {
            buffer: &src,
            buffer_width: 3,
        };
        let err = fb.transfer(op, region((0, 0), (0, 0), 3, 3), 8).unwrap_err();
        assert!(matches!(err, DeviceError::OutOfBounds { .. }));
        assert!(fb.pixels.iter().all(|p| *p == Pixel::BLACK));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let mut fb = Framebuffer::new(4, 4);
        let mut dst = vec![Pixel::TRANSPARENT; 3];
        let op = BltOperation::VideoToBuffer {
            buffer: &mut dst,
            buffer_width: 2,
        };
        let err = fb.transfer(op, region((0, 0), (0, 0), 2, 2), 16).unwrap_err();
        assert!(matches!(err, DeviceError::BufferTooSmall { len: 3, needed: 4 }));
    }

    #[test]
    fn test_empty_region_is_ok() {
        let mut fb = Framebuffer::new(1, 1);
        let op = BltOperation::BufferToVideo {
            buffer: &[],
            buffer_width: 0,
        };
        assert!(fb.transfer(op, region((0, 0), (5, 5), 0, 3), 4).is_ok());
    }
}
