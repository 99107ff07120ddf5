//! SDL2 window acting as a graphics output device, for running the boot UI
//! on a desktop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::EventPump;

use super::framebuffer::Framebuffer;
use super::{BltOperation, BltRegion, DeviceError, DisplayMode, GraphicsOutput};

struct SdlState {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    framebuffer: Framebuffer,
}

impl SdlState {
    /// Upload the framebuffer and show it.
    /// ARGB8888 is stored B, G, R, A in memory, the same as native pixels.
    fn flush(&mut self) -> Result<(), String> {
        let width = self.framebuffer.width;
        let height = self.framebuffer.height;
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        texture
            .update(
                None,
                bytemuck::cast_slice(&self.framebuffer.pixels),
                width as usize * crate::buffer::PIXEL_SIZE,
            )
            .map_err(|e| e.to_string())?;
        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}

/// Window-backed screen. Clones share the same window.
#[derive(Clone)]
pub struct SdlDisplay {
    state: Rc<RefCell<SdlState>>,
}

impl SdlDisplay {
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| e.to_string())?;
        let event_pump = sdl_context.event_pump()?;

        let mut state = SdlState {
            canvas,
            event_pump,
            framebuffer: Framebuffer::new(width, height),
        };
        state.flush()?;
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
        })
    }

    /// Keep the window responsive until it is closed or Escape is pressed
    pub fn wait_for_close(&self) {
        loop {
            let mut state = self.state.borrow_mut();
            for event in state.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => return,
                    _ => {},
                }
            }
            drop(state);
            std::thread::sleep(Duration::from_millis(16));
        }
    }
}

impl GraphicsOutput for SdlDisplay {
    fn mode(&self) -> Result<DisplayMode, DeviceError> {
        let state = self.state.borrow();
        Ok(DisplayMode {
            width: state.framebuffer.width,
            height: state.framebuffer.height,
        })
    }

    fn blt(&mut self, op: BltOperation<'_>, region: BltRegion, delta: usize) -> Result<(), DeviceError> {
        let mut state = self.state.borrow_mut();
        let presenting = matches!(op, BltOperation::BufferToVideo { .. });
        state.framebuffer.transfer(op, region, delta)?;
        if presenting {
            state.flush().map_err(DeviceError::Device)?;
        }
        Ok(())
    }
}
