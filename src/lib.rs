//! 32-bit image buffers for boot-time user interfaces.
//!
//! [`PixelBuffer`] holds native blue-first pixels and provides fills, channel
//! reordering, a smoothing scaler and alpha-over composition. [`codec`] moves
//! pixels in and out of PNG/SVG codecs, and [`ScreenPort`] captures and
//! presents buffers through the firmware graphics interfaces.

pub mod buffer;
pub mod codec;
pub mod config;
pub mod display;

pub use crate::buffer::{Pixel, PixelBuffer, Rect};
pub use crate::codec::{AlphaPolicy, CodecError, RasterCodec, VectorCodec};
pub use crate::config::BootConfig;
pub use crate::display::{DeviceLocator, DisplayInterface, ScreenPort};
