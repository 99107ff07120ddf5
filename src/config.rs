//! Boot UI graphics configuration, stored as JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::buffer::Pixel;
use crate::codec::AlphaPolicy;

pub const DEFAULT_SCREEN_WIDTH: u32 = 1024;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 768;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Resolution of the software screen
    pub screen_width: u32,
    pub screen_height: u32,
    /// Background fill, `[r, g, b, a]`
    pub background: [u8; 4],
    /// Alpha handling when saving screenshots and images
    pub encode_alpha: AlphaPolicy,
    /// Extra scale applied to the splash image
    pub icon_scale: f32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            background: [32, 32, 40, 255],
            encode_alpha: AlphaPolicy::Opaque,
            icon_scale: 1.0,
        }
    }
}

impl BootConfig {
    pub fn background_pixel(&self) -> Pixel {
        Pixel::from(self.background)
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
