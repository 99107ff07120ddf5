//! Screen access through the firmware graphics interfaces.
//!
//! Two mutually exclusive device interfaces exist: the newer graphics output
//! interface and the legacy UGA draw interface. `ScreenPort::probe` picks one
//! once at startup (graphics output first) and every capture/present goes
//! through it. With no interface every operation is a silent no-op.

mod framebuffer;
mod memory;
#[cfg(feature = "sdl")]
mod sdl;

pub use framebuffer::Framebuffer;
pub use memory::MemoryDisplay;
#[cfg(feature = "sdl")]
pub use sdl::SdlDisplay;

use std::fmt;

use thiserror::Error;

use crate::buffer::{Pixel, PixelBuffer, Rect, PIXEL_SIZE};

// ============================================================================
// Device interfaces
// ============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeviceError {
    #[error("display mode query failed")]
    ModeUnavailable,

    #[error("block transfer falls outside the {width}x{height} screen")]
    OutOfBounds { width: u32, height: u32 },

    #[error("pixel buffer of {len} pixels too small, transfer needs {needed}")]
    BufferTooSmall { len: usize, needed: usize },

    #[error("device failure: {0}")]
    Device(String),
}

/// Native resolution reported by the graphics output interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
}

/// Mode reported by the legacy UGA interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UgaMode {
    pub horizontal_resolution: u32,
    pub vertical_resolution: u32,
    pub color_depth: u32,
    pub refresh_rate: u32,
}

/// Direction and borrowed pixels of one block transfer.
/// `buffer_width` is the row length used to address `buffer`.
pub enum BltOperation<'a> {
    VideoToBuffer {
        buffer: &'a mut [Pixel],
        buffer_width: u32,
    },
    BufferToVideo {
        buffer: &'a [Pixel],
        buffer_width: u32,
    },
}

/// Source and destination origins plus the transfer size.
/// For `VideoToBuffer` the source is the screen, for `BufferToVideo` the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BltRegion {
    pub src_x: u32,
    pub src_y: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub width: u32,
    pub height: u32,
}

/// Newer firmware graphics interface
pub trait GraphicsOutput {
    fn mode(&self) -> Result<DisplayMode, DeviceError>;

    /// `delta` is the screen scanline pitch in bytes
    fn blt(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError>;
}

/// Legacy firmware graphics interface
pub trait UgaDraw {
    fn get_mode(&self) -> Result<UgaMode, DeviceError>;

    /// `delta` is the screen scanline pitch in bytes
    fn blt(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError>;
}

/// Source of device interfaces, asked once at startup
pub trait DeviceLocator {
    fn locate_graphics_output(&mut self) -> Option<Box<dyn GraphicsOutput>>;
    fn locate_uga_draw(&mut self) -> Option<Box<dyn UgaDraw>>;
}

/// Locator over interfaces known up front. Each is handed out once.
#[derive(Default)]
pub struct FixedLocator {
    pub graphics_output: Option<Box<dyn GraphicsOutput>>,
    pub uga_draw: Option<Box<dyn UgaDraw>>,
}

impl DeviceLocator for FixedLocator {
    fn locate_graphics_output(&mut self) -> Option<Box<dyn GraphicsOutput>> {
        self.graphics_output.take()
    }

    fn locate_uga_draw(&mut self) -> Option<Box<dyn UgaDraw>> {
        self.uga_draw.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    GraphicsOutput,
    UgaDraw,
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GraphicsOutput => write!(f, "graphics output"),
            Self::UgaDraw => write!(f, "UGA draw"),
        }
    }
}

/// The one interface a port talks to
pub enum DisplayInterface {
    GraphicsOutput(Box<dyn GraphicsOutput>),
    UgaDraw(Box<dyn UgaDraw>),
}

impl DisplayInterface {
    pub const fn kind(&self) -> InterfaceKind {
        match self {
            Self::GraphicsOutput(_) => InterfaceKind::GraphicsOutput,
            Self::UgaDraw(_) => InterfaceKind::UgaDraw,
        }
    }

    fn native_resolution(&self) -> Result<(u32, u32), DeviceError> {
        match self {
            Self::GraphicsOutput(gop) => gop.mode().map(|m| (m.width, m.height)),
            Self::UgaDraw(uga) => uga
                .get_mode()
                .map(|m| (m.horizontal_resolution, m.vertical_resolution)),
        }
    }

    fn blt(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError> {
        match self {
            Self::GraphicsOutput(gop) => gop.blt(op, region, delta),
            Self::UgaDraw(uga) => uga.blt(op, region, delta),
        }
    }
}

// ============================================================================
// ScreenPort
// ============================================================================

/// A requested area after clamping to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenArea {
    /// Top-left on screen
    screen_x: u32,
    screen_y: u32,
    /// How much of the request was cut off on the left/top by negative origins
    skip_x: u32,
    skip_y: u32,
    width: u32,
    height: u32,
}

/// Clamp a `width x height` area at `(x, y)` to a `native_w x native_h` screen:
/// the size becomes `min(width, native_w - x)` (never negative), likewise for height.
fn clamp_to_screen(x: i32, y: i32, width: u32, height: u32, native_w: u32, native_h: u32) -> ScreenArea {
    let (screen_x, skip_x, width) = clamp_axis(x, width, native_w);
    let (screen_y, skip_y, height) = clamp_axis(y, height, native_h);
    ScreenArea {
        screen_x,
        screen_y,
        skip_x,
        skip_y,
        width,
        height,
    }
}

fn clamp_axis(pos: i32, len: u32, native: u32) -> (u32, u32, u32) {
    let start = i64::from(pos).max(0);
    let skip = start - i64::from(pos);
    let remaining = (i64::from(len) - skip).max(0);
    let visible = (i64::from(native) - start).max(0);
    (
        start.min(i64::from(native)) as u32,
        skip.min(i64::from(len)) as u32,
        remaining.min(visible) as u32,
    )
}

/// Captures screen areas into buffers and presents buffers on screen.
pub struct ScreenPort {
    interface: Option<DisplayInterface>,
}

impl ScreenPort {
    /// Look for a display interface: graphics output first, UGA draw as fallback
    pub fn probe(locator: &mut impl DeviceLocator) -> Self {
        if let Some(gop) = locator.locate_graphics_output() {
            log::info!("display: using {} interface", InterfaceKind::GraphicsOutput);
            return Self::new(DisplayInterface::GraphicsOutput(gop));
        }
        if let Some(uga) = locator.locate_uga_draw() {
            log::info!(
                "display: {} missing, using {} interface",
                InterfaceKind::GraphicsOutput,
                InterfaceKind::UgaDraw
            );
            return Self::new(DisplayInterface::UgaDraw(uga));
        }
        log::warn!("display: no graphics interface found, screen operations disabled");
        Self::unavailable()
    }

    pub const fn new(interface: DisplayInterface) -> Self {
        Self {
            interface: Some(interface),
        }
    }

    /// A port with no device; every operation is a no-op
    pub const fn unavailable() -> Self {
        Self { interface: None }
    }

    pub const fn is_available(&self) -> bool {
        self.interface.is_some()
    }

    pub fn interface_kind(&self) -> Option<InterfaceKind> {
        self.interface.as_ref().map(DisplayInterface::kind)
    }

    /// Current native resolution, if a device is present and answers
    pub fn native_resolution(&self) -> Option<(u32, u32)> {
        self.interface.as_ref()?.native_resolution().ok()
    }

    /// Copy a screen area into `buffer`.
    ///
    /// A zero `area.width`/`area.height` means "the buffer's current size". The
    /// area is clamped to the native resolution, the buffer is resized to the
    /// clamped size and filled with one block transfer. If the mode query fails
    /// the buffer is left untouched.
    pub fn capture(&mut self, buffer: &mut PixelBuffer, area: Rect) {
        let Some(interface) = self.interface.as_mut() else {
            log::debug!("capture skipped: no display interface");
            return;
        };
        let (native_w, native_h) = match interface.native_resolution() {
            Ok(res) => res,
            Err(e) => {
                log::warn!("capture aborted: {e}");
                return;
            },
        };

        let width = if area.width == 0 { buffer.width() } else { area.width };
        let height = if area.height == 0 { buffer.height() } else { area.height };
        let clamped = clamp_to_screen(area.x, area.y, width, height, native_w, native_h);
        log::debug!(
            "capture {}x{} at ({}, {}) clamped to {}x{} on {native_w}x{native_h}",
            width,
            height,
            area.x,
            area.y,
            clamped.width,
            clamped.height
        );

        buffer.reset_to(clamped.width, clamped.height);
        if clamped.width == 0 || clamped.height == 0 {
            return;
        }

        let region = BltRegion {
            src_x: clamped.screen_x,
            src_y: clamped.screen_y,
            dst_x: 0,
            dst_y: 0,
            width: clamped.width,
            height: clamped.height,
        };
        let op = BltOperation::VideoToBuffer {
            buffer: buffer.pixels_mut(),
            buffer_width: clamped.width,
        };
        if let Err(e) = interface.blt(op, region, native_w as usize * PIXEL_SIZE) {
            log::warn!("capture transfer failed: {e}");
        }
    }

    /// Draw `buffer` on screen with its top-left corner at `(x, y)`.
    /// Parts falling outside the native resolution are dropped.
    pub fn present(&mut self, buffer: &PixelBuffer, x: i32, y: i32) {
        let Some(interface) = self.interface.as_mut() else {
            log::debug!("present skipped: no display interface");
            return;
        };
        let (native_w, native_h) = match interface.native_resolution() {
            Ok(res) => res,
            Err(e) => {
                log::warn!("present aborted: {e}");
                return;
            },
        };

        let clamped = clamp_to_screen(x, y, buffer.width(), buffer.height(), native_w, native_h);
        if clamped.width == 0 || clamped.height == 0 {
            log::debug!("present skipped: {}x{} at ({x}, {y}) is off screen", buffer.width(), buffer.height());
            return;
        }

        let region = BltRegion {
            src_x: clamped.skip_x,
            src_y: clamped.skip_y,
            dst_x: clamped.screen_x,
            dst_y: clamped.screen_y,
            width: clamped.width,
            height: clamped.height,
        };
        let op = BltOperation::BufferToVideo {
            buffer: buffer.pixels(),
            buffer_width: buffer.width(),
        };
        if let Err(e) = interface.blt(op, region, native_w as usize * PIXEL_SIZE) {
            log::warn!("present transfer failed: {e}");
        }
    }
}

impl fmt::Debug for ScreenPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenPort")
            .field("interface", &self.interface_kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gop_port(display: &MemoryDisplay) -> ScreenPort {
        ScreenPort::new(DisplayInterface::GraphicsOutput(Box::new(display.clone())))
    }

    fn uga_port(display: &MemoryDisplay) -> ScreenPort {
        ScreenPort::new(DisplayInterface::UgaDraw(Box::new(display.clone())))
    }

    fn numbered_screen(width: u32, height: u32) -> MemoryDisplay {
        let display = MemoryDisplay::new(width, height);
        let mut contents = PixelBuffer::with_size(width, height);
        for (i, p) in contents.pixels_mut().iter_mut().enumerate() {
            *p = Pixel::rgb(i as u8, 0, 0);
        }
        display.load(&contents);
        display
    }

    #[test]
    fn test_clamp_axis() {
        assert_eq!(clamp_axis(2, 5, 4), (2, 0, 2));
        assert_eq!(clamp_axis(0, 3, 4), (0, 0, 3));
        assert_eq!(clamp_axis(-2, 5, 4), (0, 2, 3));
        assert_eq!(clamp_axis(-9, 5, 4), (0, 5, 0));
        assert_eq!(clamp_axis(7, 5, 4), (4, 0, 0));
        assert_eq!(clamp_axis(i32::MAX, u32::MAX, 4), (4, 0, 0));
    }

    #[test]
    fn test_probe_prefers_graphics_output() {
        let mut locator = FixedLocator {
            graphics_output: Some(Box::new(MemoryDisplay::new(4, 4))),
            uga_draw: Some(Box::new(MemoryDisplay::new(4, 4))),
        };
        let port = ScreenPort::probe(&mut locator);
        assert_eq!(port.interface_kind(), Some(InterfaceKind::GraphicsOutput));
    }

    #[test]
    fn test_probe_falls_back_to_uga() {
        let mut locator = FixedLocator {
            graphics_output: None,
            uga_draw: Some(Box::new(MemoryDisplay::new(4, 4))),
        };
        let port = ScreenPort::probe(&mut locator);
        assert_eq!(port.interface_kind(), Some(InterfaceKind::UgaDraw));
    }

    #[test]
    fn test_interface_kind_names() {
        assert_eq!(InterfaceKind::GraphicsOutput.to_string(), "graphics output");
        assert_eq!(InterfaceKind::UgaDraw.to_string(), "UGA draw");
    }

    #[test]
    fn test_probe_nothing_found() {
        let port = ScreenPort::probe(&mut FixedLocator::default());
        assert!(!port.is_available());
        assert_eq!(port.native_resolution(), None);
    }

    #[test]
    fn test_no_device_is_noop() {
        let mut port = ScreenPort::unavailable();
        let mut buf = PixelBuffer::with_size(3, 2);
        buf.fill(Pixel::WHITE);
        let before = buf.clone();
        port.capture(&mut buf, Rect::new(0, 0, 10, 10));
        port.present(&buf, 0, 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_capture_inside_screen() {
        let display = numbered_screen(4, 4);
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::new();
        port.capture(&mut buf, Rect::new(1, 2, 2, 2));
        assert_eq!((buf.width(), buf.height()), (2, 2));
        let reds: Vec<u8> = buf.pixels().iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![9, 10, 13, 14]);
        assert_eq!(display.transfer_count(), 1);
    }

    #[test]
    fn test_capture_clamps_to_native_resolution() {
        let display = numbered_screen(4, 3);
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::new();
        port.capture(&mut buf, Rect::new(2, 1, 10, 10));
        assert_eq!((buf.width(), buf.height()), (2, 2));
        assert_eq!(buf.pixels().len(), 4);
        let reds: Vec<u8> = buf.pixels().iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![6, 7, 10, 11]);
    }

    #[test]
    fn test_capture_zero_size_uses_buffer_size() {
        let display = numbered_screen(4, 4);
        let mut port = uga_port(&display);
        let mut buf = PixelBuffer::with_size(3, 1);
        port.capture(&mut buf, Rect::new(0, 3, 0, 0));
        assert_eq!((buf.width(), buf.height()), (3, 1));
        let reds: Vec<u8> = buf.pixels().iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![12, 13, 14]);
    }

    #[test]
    fn test_capture_off_screen_gives_empty_buffer() {
        let display = numbered_screen(4, 4);
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::with_size(2, 2);
        port.capture(&mut buf, Rect::new(9, 0, 2, 2));
        assert_eq!(buf.width(), 0);
        assert!(buf.is_empty());
        assert_eq!(display.transfer_count(), 0);
    }

    #[test]
    fn test_capture_mode_failure_aborts() {
        let display = numbered_screen(4, 4);
        display.set_mode_failure(true);
        let mut port = uga_port(&display);
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.fill(Pixel::WHITE);
        let before = buf.clone();
        port.capture(&mut buf, Rect::new(0, 0, 2, 2));
        assert_eq!(buf, before);
        assert_eq!(display.transfer_count(), 0);
    }

    #[test]
    fn test_present_full_screen() {
        let display = MemoryDisplay::new(3, 2);
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::with_size(3, 2);
        buf.fill(Pixel::rgb(1, 2, 3));
        port.present(&buf, 0, 0);
        assert_eq!(display.snapshot(), buf);
    }

    #[test]
    fn test_present_small_image_uses_own_rows() {
        let display = MemoryDisplay::new(4, 4);
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.fill(Pixel::WHITE);
        port.present(&buf, 1, 1);

        let mut expected = PixelBuffer::with_size(4, 4);
        expected.fill(Pixel::BLACK);
        expected.fill_area(Pixel::WHITE, Rect::new(1, 1, 2, 2));
        assert_eq!(display.snapshot(), expected);
    }

    #[test]
    fn test_present_clamps_at_edges() {
        let display = MemoryDisplay::new(4, 4);
        let mut port = uga_port(&display);
        let mut buf = PixelBuffer::with_size(3, 3);
        for (i, p) in buf.pixels_mut().iter_mut().enumerate() {
            *p = Pixel::rgb(100 + i as u8, 0, 0);
        }

        port.present(&buf, 2, 3);
        let screen = display.snapshot();
        assert_eq!(screen.pixel(2, 3).red, 100);
        assert_eq!(screen.pixel(3, 3).red, 101);
        assert_eq!(screen.pixel(2, 2), Pixel::BLACK);

        // Negative origin drops the top-left part of the image
        port.present(&buf, -1, -2);
        let screen = display.snapshot();
        assert_eq!(screen.pixel(0, 0).red, 107);
        assert_eq!(screen.pixel(1, 0).red, 108);
        assert_eq!(screen.pixel(2, 0), Pixel::BLACK);
        assert_eq!(screen.pixel(0, 1), Pixel::BLACK);
    }

    #[test]
    fn test_present_off_screen_is_noop() {
        let display = MemoryDisplay::new(2, 2);
        let mut port = gop_port(&display);
        let buf = PixelBuffer::with_size(2, 2);
        port.present(&buf, 2, 0);
        port.present(&buf, -2, 0);
        assert_eq!(display.transfer_count(), 0);
    }

    #[test]
    fn test_present_mode_failure_aborts() {
        let display = MemoryDisplay::new(2, 2);
        display.set_mode_failure(true);
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.fill(Pixel::WHITE);
        port.present(&buf, 0, 0);
        assert_eq!(display.transfer_count(), 0);
        display.set_mode_failure(false);
        assert!(display.snapshot().pixels().iter().all(|p| *p == Pixel::BLACK));
    }

    #[test]
    fn test_present_passes_screen_pitch() {
        let display = MemoryDisplay::new(5, 3);
        let mut port = gop_port(&display);
        let buf = PixelBuffer::with_size(2, 2);
        port.present(&buf, 0, 0);
        assert_eq!(display.last_delta(), Some(5 * PIXEL_SIZE));
    }

    #[test]
    fn test_capture_then_present_round_trip() {
        let display = numbered_screen(5, 5);
        let original = display.snapshot();
        let mut port = gop_port(&display);
        let mut buf = PixelBuffer::new();
        port.capture(&mut buf, Rect::new(1, 1, 3, 3));
        display.load(&PixelBuffer::with_size(5, 5));
        port.present(&buf, 1, 1);
        let screen = display.snapshot();
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(screen.pixel(x, y), original.pixel(x, y));
            }
        }
    }
}
