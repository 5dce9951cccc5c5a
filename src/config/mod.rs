// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! The configuration is organized into logical sections:
//! - `[general]` - Language
//! - `[camera]` - Start-up state, facing, devices and capture constraints
//! - `[upload]` - Wallet bridge endpoint and storage tags
//! - `[gallery]` - Search endpoint, display gateway and wallet address
//! - `[diagnostics]` - Event buffer size
//!
//! # Path Resolution
//!
//! The config file location can be customized for testing or portable deployments:
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `SNAPPY_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use snappy::config::{self, Config};
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.general.language = Some("fr".to_string());
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::application::port::CaptureConstraints;
use crate::domain::diagnostics::BufferCapacity;
use crate::domain::media::{AspectRatio, JpegQuality, ResolutionHint};
use crate::domain::session::Facing;
use crate::error::{Error, Result};
use crate::infrastructure::{CameraDevices, GallerySettings, UploadSettings};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneralConfig {
    /// UI language code (e.g., "en-US", "fr").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Camera settings.
///
/// Device names default to the platform's usual first camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    /// Switch the camera on at start-up.
    #[serde(default = "default_start_enabled")]
    pub start_enabled: bool,

    /// Camera requested first.
    #[serde(
        default,
        deserialize_with = "deserialize_facing",
        serialize_with = "serialize_facing"
    )]
    pub facing: Facing,

    /// Device opened for the front camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_device: Option<String>,

    /// Device opened for the back camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_device: Option<String>,

    /// libavdevice input format (`v4l2`, `avfoundation`, `dshow`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,

    /// Preferred frame size, as `"WIDTHxHEIGHT"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Preferred aspect ratio, as `"W:H"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,

    /// JPEG quality of captured stills (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_enabled: DEFAULT_START_ENABLED,
            facing: Facing::default(),
            front_device: None,
            back_device: None,
            input_format: None,
            resolution: None,
            aspect_ratio: None,
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Upload settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    /// Wallet bridge URL. Uploading is disabled while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// `App-Name` tag.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// `App-Version` tag.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Network timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            app_name: default_app_name(),
            app_version: default_app_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Gallery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryConfig {
    /// GraphQL search endpoint.
    #[serde(default = "default_graphql_endpoint")]
    pub graphql_endpoint: String,

    /// Gateway used to build image URLs.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// `App-Name` tag values searched.
    #[serde(default = "default_gallery_app_names")]
    pub app_names: Vec<String>,

    /// Wallet address whose uploads are listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            graphql_endpoint: default_graphql_endpoint(),
            gateway_url: default_gateway_url(),
            app_names: default_gallery_app_names(),
            owner: None,
        }
    }
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// Number of events kept in memory.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Camera settings.
    #[serde(default)]
    pub camera: CameraConfig,

    /// Upload settings.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Gallery settings.
    #[serde(default)]
    pub gallery: GalleryConfig,

    /// Diagnostics settings.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Returns the constraints of the first acquisition.
    ///
    /// Unparsable resolution or aspect ratio strings are ignored.
    #[must_use]
    pub fn capture_constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            facing: self.camera.facing,
            resolution: self
                .camera
                .resolution
                .as_deref()
                .and_then(|raw| raw.parse::<ResolutionHint>().ok()),
            aspect_ratio: self
                .camera
                .aspect_ratio
                .as_deref()
                .and_then(|raw| raw.parse::<AspectRatio>().ok()),
        }
    }

    /// Returns the devices opened by the camera source.
    #[must_use]
    pub fn camera_devices(&self) -> CameraDevices {
        let defaults = CameraDevices::default();
        CameraDevices {
            input_format: self
                .camera
                .input_format
                .clone()
                .unwrap_or(defaults.input_format),
            front: self.camera.front_device.clone().unwrap_or(defaults.front),
            back: self.camera.back_device.clone().unwrap_or(defaults.back),
        }
    }

    /// Returns the clamped JPEG quality.
    #[must_use]
    pub fn jpeg_quality(&self) -> JpegQuality {
        JpegQuality::new(self.camera.jpeg_quality)
    }

    /// Returns the clamped network timeout.
    #[must_use]
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upload
                .timeout_secs
                .clamp(MIN_UPLOAD_TIMEOUT_SECS, MAX_UPLOAD_TIMEOUT_SECS),
        )
    }

    /// Returns the upload client settings.
    #[must_use]
    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            endpoint: self.upload.endpoint.clone(),
            app_name: self.upload.app_name.clone(),
            app_version: self.upload.app_version.clone(),
            timeout: self.network_timeout(),
        }
    }

    /// Returns the gallery client settings.
    #[must_use]
    pub fn gallery_settings(&self) -> GallerySettings {
        GallerySettings {
            endpoint: self.gallery.graphql_endpoint.clone(),
            app_names: self.gallery.app_names.clone(),
            timeout: self.network_timeout(),
        }
    }

    /// Returns the clamped diagnostics buffer capacity.
    #[must_use]
    pub fn buffer_capacity(&self) -> BufferCapacity {
        BufferCapacity::new(self.diagnostics.buffer_capacity)
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_start_enabled() -> bool {
    DEFAULT_START_ENABLED
}

fn default_jpeg_quality() -> u8 {
    JpegQuality::default().value()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_app_version() -> String {
    DEFAULT_APP_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_UPLOAD_TIMEOUT_SECS
}

fn default_graphql_endpoint() -> String {
    DEFAULT_GRAPHQL_ENDPOINT.to_string()
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_buffer_capacity() -> usize {
    BufferCapacity::default().value()
}

fn deserialize_facing<'de, D>(deserializer: D) -> std::result::Result<Facing, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;
    raw.parse::<Facing>().map_err(D::Error::custom)
}

fn serialize_facing<S>(facing: &Facing, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(facing.as_str())
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config file path with an optional override.
fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message key explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(_) => {
                    return (
                        Config::default(),
                        Some("notification-config-load-error".to_string()),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
