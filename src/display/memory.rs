use std::cell::RefCell;
use std::rc::Rc;

use super::framebuffer::Framebuffer;
use super::{BltOperation, BltRegion, DeviceError, DisplayMode, GraphicsOutput, UgaDraw, UgaMode};
use crate::buffer::PixelBuffer;

struct MemoryState {
    framebuffer: Framebuffer,
    fail_mode: bool,
    transfers: usize,
    last_delta: Option<usize>,
}

/// Software screen living in memory.
///
/// Speaks both the graphics output and the UGA interface. Clones are handles
/// to the same screen, so one can be given to a `ScreenPort` while another is
/// kept to inspect what was drawn.
#[derive(Clone)]
pub struct MemoryDisplay {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryDisplay {
    /// New screen cleared to opaque black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryState {
                framebuffer: Framebuffer::new(width, height),
                fail_mode: false,
                transfers: 0,
                last_delta: None,
            })),
        }
    }

    /// Copy of the current screen contents
    pub fn snapshot(&self) -> PixelBuffer {
        let state = self.state.borrow();
        let fb = &state.framebuffer;
        PixelBuffer::from_pixels(fb.width, fb.height, &fb.pixels).unwrap_or_default()
    }

    /// Replace the screen contents. Ignored unless `contents` matches the resolution.
    pub fn load(&self, contents: &PixelBuffer) {
        let mut state = self.state.borrow_mut();
        let fb = &mut state.framebuffer;
        if contents.width() == fb.width && contents.height() == fb.height {
            fb.pixels.copy_from_slice(contents.pixels());
        } else {
            log::warn!(
                "memory display: {}x{} contents do not fit {}x{} screen",
                contents.width(),
                contents.height(),
                fb.width,
                fb.height
            );
        }
    }

    /// Make mode queries fail, as a screen without a usable mode would
    pub fn set_mode_failure(&self, fail: bool) {
        self.state.borrow_mut().fail_mode = fail;
    }

    /// Number of block transfers issued so far
    pub fn transfer_count(&self) -> usize {
        self.state.borrow().transfers
    }

    /// Scanline pitch passed with the most recent transfer
    pub fn last_delta(&self) -> Option<usize> {
        self.state.borrow().last_delta
    }

    fn query(&self) -> Result<(u32, u32), DeviceError> {
        let state = self.state.borrow();
        if state.fail_mode {
            return Err(DeviceError::ModeUnavailable);
        }
        Ok((state.framebuffer.width, state.framebuffer.height))
    }

    fn transfer(&self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError> {
        let mut state = self.state.borrow_mut();
        state.transfers += 1;
        state.last_delta = Some(delta);
        state.framebuffer.transfer(op, region, delta)
    }
}

impl GraphicsOutput for MemoryDisplay {
    fn mode(&self) -> Result<DisplayMode, DeviceError> {
        let (width, height) = self.query()?;
        Ok(DisplayMode { width, height })
    }

    fn blt(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError> {
        self.transfer(op, region, delta)
    }
}

impl UgaDraw for MemoryDisplay {
    fn get_mode(&self) -> Result<UgaMode, DeviceError> {
        let (width, height) = self.query()?;
        Ok(UgaMode {
            horizontal_resolution: width,
            vertical_resolution: height,
            color_depth: 32,
            refresh_rate: 60,
        })
    }

    fn blt(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError> {
        self.transfer(op, region, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Pixel;

    #[test]
    fn test_clones_share_screen() {
        let a = MemoryDisplay::new(2, 2);
        let b = a.clone();
        let mut contents = PixelBuffer::with_size(2, 2);
        contents.fill(Pixel::WHITE);
        a.load(&contents);
        assert_eq!(b.snapshot(), contents);
    }

    #[test]
    fn test_both_interfaces_report_same_mode() {
        let display = MemoryDisplay::new(640, 480);
        assert_eq!(
            GraphicsOutput::mode(&display),
            Ok(DisplayMode {
                width: 640,
                height: 480
            })
        );
        let uga = UgaDraw::get_mode(&display).unwrap();
        assert_eq!((uga.horizontal_resolution, uga.vertical_resolution), (640, 480));
    }

    #[test]
    fn test_mode_failure() {
        let display = MemoryDisplay::new(1, 1);
        display.set_mode_failure(true);
        assert_eq!(GraphicsOutput::mode(&display), Err(DeviceError::ModeUnavailable));
        assert!(UgaDraw::get_mode(&display).is_err());
    }

    #[test]
    fn test_load_rejects_wrong_size() {
        let display = MemoryDisplay::new(2, 2);
        display.load(&PixelBuffer::with_size(3, 3));
        assert!(display.snapshot().pixels().iter().all(|p| *p == Pixel::BLACK));
    }
}
