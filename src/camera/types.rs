//! Camera types and data structures.

use std::fmt;

use opencv::videoio;
use serde::Deserialize;

/// Result of probing one device index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// The device could not be opened
    Unavailable,
    /// The device opened but its first read delivered no frame
    NoFrame,
    /// The device delivered a frame of this size
    Working(Resolution),
}

/// A probed camera device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraInfo {
    /// Device index passed to the backend
    pub index: i32,
    /// What the probe found
    pub status: DeviceStatus,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            DeviceStatus::Unavailable => write!(f, "[{}] not available", self.index),
            DeviceStatus::NoFrame => write!(f, "[{}] opens but delivers no frames", self.index),
            DeviceStatus::Working(res) => write!(f, "[{}] working ({})", self.index, res),
        }
    }
}

/// Capture resolution requested from (or reported by) a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Low resolution (320x240)
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 240,
    };

    /// Medium resolution (640x480) - what the demo asks for by default
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// High resolution (1280x720)
    pub const HIGH: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Video I/O backend used to open devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackend {
    /// Let OpenCV pick
    #[default]
    Any,
    /// DirectShow (Windows)
    Dshow,
    /// Media Foundation (Windows)
    Msmf,
    /// Video4Linux2
    V4l2,
    /// AVFoundation (macOS)
    Avfoundation,
}

impl CaptureBackend {
    /// OpenCV API preference passed to `VideoCapture::new`.
    pub fn api_preference(self) -> i32 {
        match self {
            Self::Any => videoio::CAP_ANY,
            Self::Dshow => videoio::CAP_DSHOW,
            Self::Msmf => videoio::CAP_MSMF,
            Self::V4l2 => videoio::CAP_V4L2,
            Self::Avfoundation => videoio::CAP_AVFOUNDATION,
        }
    }
}

impl fmt::Display for CaptureBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Dshow => "dshow",
            Self::Msmf => "msmf",
            Self::V4l2 => "v4l2",
            Self::Avfoundation => "avfoundation",
        };
        f.write_str(name)
    }
}

/// Optional device controls. Unset fields are left at the driver default.
///
/// The capture buffer defaults to a single frame so the displayed image is
/// the latest one; a size of 0 leaves the driver's buffering alone.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraControls {
    pub buffer_size: Option<u32>,
    pub auto_exposure: Option<f64>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub gain: Option<f64>,
}

impl Default for CameraControls {
    fn default() -> Self {
        Self {
            buffer_size: Some(1),
            auto_exposure: None,
            brightness: None,
            contrast: None,
            saturation: None,
            gain: None,
        }
    }
}

impl CameraControls {
    /// (property id, name, value) for every control that is set.
    pub fn properties(&self) -> Vec<(i32, &'static str, f64)> {
        let mut props = Vec::new();
        if let Some(size) = self.buffer_size.filter(|s| *s > 0) {
            props.push((videoio::CAP_PROP_BUFFERSIZE, "buffer size", f64::from(size)));
        }
        let optional = [
            (videoio::CAP_PROP_AUTO_EXPOSURE, "auto exposure", self.auto_exposure),
            (videoio::CAP_PROP_BRIGHTNESS, "brightness", self.brightness),
            (videoio::CAP_PROP_CONTRAST, "contrast", self.contrast),
            (videoio::CAP_PROP_SATURATION, "saturation", self.saturation),
            (videoio::CAP_PROP_GAIN, "gain", self.gain),
        ];
        props.extend(
            optional
                .into_iter()
                .filter_map(|(id, name, value)| value.map(|v| (id, name, v))),
        );
        props
    }
}

/// Settings applied to an acquired camera. All of them are hints: a device
/// is free to ignore values it does not support.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Extra device controls
    pub controls: CameraControls,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fps: 30,
            controls: CameraControls::default(),
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Every candidate index failed to open or to deliver a frame
    #[error(
        "No working camera found (tried indices {tried:?}).\n\n\
         Check that a camera is connected, that no other application is using it, \
         and that camera access is permitted"
    )]
    NoWorkingCamera { tried: Vec<i32> },
    /// The vision library refused to open the device
    #[error("Failed to open camera {index}: {source}")]
    OpenFailed {
        index: i32,
        #[source]
        source: opencv::Error,
    },
    /// A frame read raised an error (as opposed to returning no frame)
    #[error("Failed to read frame: {0}")]
    ReadFailed(#[source] opencv::Error),
    /// Setting or querying a capture property raised an error
    #[error("Failed to configure camera: {0}")]
    ConfigureFailed(#[source] opencv::Error),
}
