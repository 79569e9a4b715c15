//! Configuration file handling for webcam-analyzer.
//!
//! Loads configuration from `<config dir>/webcam-analyzer/config.toml` or a
//! custom path. Every field has a default, so a missing file or a partial file
//! is fine; values are validated after parsing.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{CameraControls, CameraSettings, CaptureBackend, Resolution};
use crate::effects::{FilterMode, FilterSettings};
use crate::event_loop::LoopSettings;
use crate::screenshot::ImageFormat;

/// Largest accepted capture width
pub const MAX_WIDTH: u32 = 7680;
/// Largest accepted capture height
pub const MAX_HEIGHT: u32 = 4320;
/// Largest accepted frame rate
pub const MAX_FPS: u32 = 120;

/// Configuration file structure for webcam-analyzer.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
    pub filters: FiltersConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Device indices probed in order
    pub indices: Vec<i32>,
    pub backend: CaptureBackend,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Settle time between opening a device and the probe read
    pub probe_delay_ms: u64,
    pub warmup_frames: u32,
    pub warmup_interval_ms: u64,
    pub controls: CameraControls,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            indices: vec![0, 1, 2],
            backend: CaptureBackend::Any,
            width: Resolution::MEDIUM.width,
            height: Resolution::MEDIUM.height,
            fps: 30,
            probe_delay_ms: 1000,
            warmup_frames: 30,
            warmup_interval_ms: 100,
            controls: CameraControls::default(),
        }
    }
}

impl CameraConfig {
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Settings requested from the device after acquisition.
    pub fn settings(&self) -> CameraSettings {
        CameraSettings {
            resolution: self.resolution(),
            fps: self.fps,
            controls: self.controls,
        }
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms)
    }

    pub fn warmup_interval(&self) -> Duration {
        Duration::from_millis(self.warmup_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Consecutive failed reads tolerated before giving up
    pub max_read_errors: u32,
    pub retry_delay_ms: u64,
    pub key_wait_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let defaults = LoopSettings::default();
        Self {
            max_read_errors: defaults.max_read_errors,
            retry_delay_ms: defaults.retry_delay.as_millis() as u64,
            key_wait_ms: defaults.key_wait.as_millis() as u64,
        }
    }
}

impl CaptureConfig {
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            max_read_errors: self.max_read_errors,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            key_wait: Duration::from_millis(self.key_wait_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FiltersConfig {
    pub initial_mode: FilterMode,
    #[serde(flatten)]
    pub settings: FilterSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub screenshot_dir: PathBuf,
    pub format: ImageFormat,
    pub window_title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("screenshots"),
            format: ImageFormat::Jpg,
            window_title: "Webcam Analyzer".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config = Self::parse(&content).map_err(|e| match e {
                ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                    path: path.clone(),
                    source,
                },
                ConfigError::Invalid { message, .. } => ConfigError::Invalid {
                    path: Some(path.clone()),
                    message,
                },
                other => other,
            })?;
            log::info!("loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            path: None,
            message,
        };

        let cam = &self.camera;
        if cam.indices.is_empty() {
            return Err(invalid("camera.indices must not be empty".to_string()));
        }
        if let Some(i) = cam.indices.iter().find(|i| **i < 0) {
            return Err(invalid(format!("camera index {} is negative", i)));
        }
        if !(1..=MAX_WIDTH).contains(&cam.width) || !(1..=MAX_HEIGHT).contains(&cam.height) {
            return Err(invalid(format!(
                "camera resolution {}x{} out of range (max {}x{})",
                cam.width, cam.height, MAX_WIDTH, MAX_HEIGHT
            )));
        }
        if !(1..=MAX_FPS).contains(&cam.fps) {
            return Err(invalid(format!(
                "camera.fps must be between 1 and {}, got {}",
                MAX_FPS, cam.fps
            )));
        }
        self.filters.settings.validate().map_err(invalid)?;
        if self.output.window_title.trim().is_empty() {
            return Err(invalid("output.window_title must not be empty".to_string()));
        }
        Ok(())
    }

    /// Write the commented default config to `path`. Never overwrites.
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when loading or writing configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid {
        path: Option<PathBuf>,
        message: String,
    },
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    AlreadyExists(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Invalid {
                path: Some(path),
                message,
            } => write!(f, "Invalid config file '{}': {}", path.display(), message),
            ConfigError::Invalid {
                path: None,
                message,
            } => write!(f, "Invalid configuration: {}", message),
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }
            ConfigError::AlreadyExists(path) => {
                write!(f, "Config file already exists: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::Invalid { .. } | ConfigError::AlreadyExists(_) => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("webcam-analyzer").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("webcam-analyzer.toml"))
}

/// Commented config written by `config init`. Parses to the defaults.
pub const DEFAULT_CONFIG_TOML: &str = r#"# webcam-analyzer configuration

[camera]
# Device indices to try, in order
indices = [0, 1, 2]
# Capture backend: any, dshow, msmf, v4l2, avfoundation
backend = "any"
# Requested capture size and frame rate
width = 640
height = 480
fps = 30
# Wait after opening a device before the first read
probe_delay_ms = 1000
# Frames discarded while auto exposure settles
warmup_frames = 30
warmup_interval_ms = 100

[camera.controls]
# Frames buffered by the driver; 1 keeps the display current, 0 leaves
# the driver default
buffer_size = 1
# Uncomment to override driver defaults. Value ranges depend on the backend.
# auto_exposure = 0.75
# brightness = 0.5
# contrast = 0.5
# saturation = 0.5
# gain = 0.0

[capture]
# Consecutive failed reads before giving up
max_read_errors = 10
retry_delay_ms = 100
# How long each iteration waits for a key press
key_wait_ms = 1

[filters]
# Mode at startup: color, grayscale, edge, blur,
# mirror-horizontal, mirror-vertical, mirror-both
initial_mode = "color"
# Kernel sizes must be odd
blur_kernel = 15
edge_low_threshold = 100.0
edge_high_threshold = 200.0
edge_blur_kernel = 5
edge_dilate = true
edge_dilate_kernel = 3
# Background brightness behind edges (0.0 - 1.0)
edge_background = 0.4
# Edge color as [r, g, b]
edge_color = [0, 255, 0]

[output]
screenshot_dir = "screenshots"
# jpg or png
format = "jpg"
window_title = "Webcam Analyzer"
"#;
