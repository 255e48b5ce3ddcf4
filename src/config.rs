// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{CameraBackendType, CameraFormat};
use crate::constants::{camera, surface};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application directory under the user's config dir
const APP_DIR: &str = "qr-analyzer";
const CONFIG_FILE: &str = "config.json";

/// Preferred camera format
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormatSettings {
    /// Resolution width
    pub width: u32,
    /// Resolution height
    pub height: u32,
    /// Pixel format (e.g., "YUYV", "MJPG")
    pub pixel_format: String,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            width: camera::DEFAULT_WIDTH,
            height: camera::DEFAULT_HEIGHT,
            pixel_format: "YUYV".to_string(),
        }
    }
}

impl From<&FormatSettings> for CameraFormat {
    fn from(settings: &FormatSettings) -> Self {
        CameraFormat {
            width: settings.width,
            height: settings.height,
            pixel_format: settings.pixel_format.clone(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use (V4L2 or a still image file)
    pub camera_backend: CameraBackendType,
    /// Camera device path, or the image served by the file backend
    pub camera_path: Option<String>,
    /// Preferred capture format
    pub camera_format: FormatSettings,
    /// Delay before the one-shot `camera` command grabs a frame
    pub camera_warmup_ms: u64,
    /// Largest image side accepted for decoding
    pub max_surface_dimension: u32,
    /// Log filter used when RUST_LOG is unset
    pub log_filter: String,
    /// Copy command replacing the built-in clipboard helpers
    pub clipboard_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_backend: CameraBackendType::default(),
            camera_path: None,
            camera_format: FormatSettings::default(),
            camera_warmup_ms: camera::DEFAULT_WARMUP_MS,
            max_surface_dimension: surface::DEFAULT_MAX_DIMENSION,
            log_filter: "warn".to_string(),
            clipboard_command: None,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> AppResult<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(AppError::Storage(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }
}
