//! Configuration management for the camera proxy
//!
//! Provides loading, saving and validation of capture defaults, file-picker
//! and overlay presentation settings, and native camera backend options.

use crate::errors::CameraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Highest z-index a page accepts; the capture overlay sits above everything
pub const HIGHEST_POSSIBLE_Z_INDEX: i32 = 2147483647;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub capture: CaptureConfig,
    pub picker: PickerConfig,
    pub overlay: OverlayConfig,
    pub native: NativeConfig,
}

/// Defaults applied to incoming capture options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Live capture width when the caller passes the -1 sentinel
    pub default_width: u32,
    /// Live capture height when the caller passes the -1 sentinel
    pub default_height: u32,
    /// Quality (0-100) when the caller omits it
    pub default_quality: u8,
    /// Output MIME type when the caller omits it
    pub default_encoding: String,
    /// Resampling filter used when scaling
    pub resize_filter: ResizeFilter,
}

/// File-selection control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerConfig {
    /// `accept` filter of the file input
    pub accept: String,
    pub class_name: String,
}

/// Live capture overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub class_name: String,
    pub z_index: i32,
    pub cancel_label: String,
    pub capture_label: String,
    /// Message shown to the user when no camera API exists
    pub unsupported_message: String,
    /// Alert the user when no camera API exists
    pub alert_on_unavailable: bool,
}

/// Native camera backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeConfig {
    pub device_index: u32,
    pub frame_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    pub fn as_filter_type(&self) -> image::imageops::FilterType {
        match self {
            ResizeFilter::Nearest => image::imageops::FilterType::Nearest,
            ResizeFilter::Triangle => image::imageops::FilterType::Triangle,
            ResizeFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            default_width: 320,
            default_height: 240,
            default_quality: 50,
            default_encoding: "image/png".to_string(),
            resize_filter: ResizeFilter::Triangle,
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            accept: "image/*".to_string(),
            class_name: "cordova-camera-select".to_string(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            class_name: "cordova-camera-capture".to_string(),
            z_index: HIGHEST_POSSIBLE_Z_INDEX,
            cancel_label: "Cancel".to_string(),
            capture_label: "Capture".to_string(),
            unsupported_message: "Browser does not support camera :(".to_string(),
            alert_on_unavailable: true,
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            frame_rate: 30,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            picker: PickerConfig::default(),
            overlay: OverlayConfig::default(),
            native: NativeConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| CameraError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: ProxyConfig = toml::from_str(&contents)
            .map_err(|e| CameraError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(CameraError::ConfigError)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CameraError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CameraError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CameraError::ConfigError(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("camera-proxy.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.capture.default_width == 0 || self.capture.default_height == 0 {
            return Err("Default capture size must be non-zero".to_string());
        }
        if self.capture.default_quality > 100 {
            return Err("Default quality must be between 0 and 100".to_string());
        }
        if !self.capture.default_encoding.starts_with("image/") {
            return Err(format!(
                "Default encoding must be an image MIME type, got '{}'",
                self.capture.default_encoding
            ));
        }
        if self.picker.accept.trim().is_empty() {
            return Err("Picker accept filter must not be empty".to_string());
        }
        if self.overlay.z_index < 0 {
            return Err("Overlay z-index must not be negative".to_string());
        }
        if self.native.frame_rate == 0 || self.native.frame_rate > 240 {
            return Err("Native frame rate must be 1-240".to_string());
        }
        Ok(())
    }
}
