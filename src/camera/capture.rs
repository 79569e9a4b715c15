//! Capture handle and the traits the frame loop reads through.

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use super::types::{CameraError, CameraSettings, CaptureBackend, Resolution};

/// Something that produces frames, one per call.
///
/// `Ok(None)` means the read completed but delivered no frame. Both that and
/// `Err` count as transient failures for the frame loop.
pub trait FrameSource {
    /// Read the next frame.
    fn read_frame(&mut self) -> Result<Option<Mat>, CameraError>;

    /// Apply capture settings. Values the device rejects are logged and skipped.
    fn apply_settings(&mut self, settings: &CameraSettings) -> Result<(), CameraError>;

    /// Resolution and frame rate the device reports after configuration.
    fn negotiated(&self) -> Result<(Resolution, f64), CameraError>;
}

/// Opens capture devices by index.
pub trait DeviceOpener {
    type Source: FrameSource;

    /// Open device `index`. Returns `Ok(None)` when the device does not open.
    fn open(&mut self, index: i32) -> Result<Option<Self::Source>, CameraError>;
}

/// Capture handle backed by an OpenCV `VideoCapture`.
///
/// Owns the device exclusively; the device is released when the handle is
/// dropped.
pub struct OpenCvCamera {
    capture: VideoCapture,
    index: i32,
}

impl std::fmt::Debug for OpenCvCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCvCamera")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl OpenCvCamera {
    fn set_property(&mut self, prop: i32, name: &str, value: f64) -> Result<(), CameraError> {
        let accepted = self
            .capture
            .set(prop, value)
            .map_err(CameraError::ConfigureFailed)?;
        if accepted {
            log::debug!("camera {}: set {} = {}", self.index, name, value);
        } else {
            log::info!(
                "camera {}: device ignored {} = {} (unsupported)",
                self.index,
                name,
                value
            );
        }
        Ok(())
    }
}

impl FrameSource for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Option<Mat>, CameraError> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .map_err(CameraError::ReadFailed)?;
        if grabbed && !frame.empty() {
            Ok(Some(frame))
        } else {
            Ok(None)
        }
    }

    fn apply_settings(&mut self, settings: &CameraSettings) -> Result<(), CameraError> {
        self.set_property(
            videoio::CAP_PROP_FRAME_WIDTH,
            "width",
            f64::from(settings.resolution.width),
        )?;
        self.set_property(
            videoio::CAP_PROP_FRAME_HEIGHT,
            "height",
            f64::from(settings.resolution.height),
        )?;
        self.set_property(videoio::CAP_PROP_FPS, "fps", f64::from(settings.fps))?;

        for (prop, name, value) in settings.controls.properties() {
            self.set_property(prop, name, value)?;
        }
        Ok(())
    }

    fn negotiated(&self) -> Result<(Resolution, f64), CameraError> {
        let width = self
            .capture
            .get(videoio::CAP_PROP_FRAME_WIDTH)
            .map_err(CameraError::ConfigureFailed)?;
        let height = self
            .capture
            .get(videoio::CAP_PROP_FRAME_HEIGHT)
            .map_err(CameraError::ConfigureFailed)?;
        let fps = self
            .capture
            .get(videoio::CAP_PROP_FPS)
            .map_err(CameraError::ConfigureFailed)?;

        Ok((
            Resolution {
                width: width.max(0.0) as u32,
                height: height.max(0.0) as u32,
            },
            fps,
        ))
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("camera {}: release failed: {}", self.index, e);
        } else {
            log::debug!("camera {} released", self.index);
        }
    }
}

/// Opens OpenCV capture devices through one backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvOpener {
    backend: CaptureBackend,
}

impl OpenCvOpener {
    pub fn new(backend: CaptureBackend) -> Self {
        Self { backend }
    }
}

impl DeviceOpener for OpenCvOpener {
    type Source = OpenCvCamera;

    fn open(&mut self, index: i32) -> Result<Option<OpenCvCamera>, CameraError> {
        let capture = VideoCapture::new(index, self.backend.api_preference())
            .map_err(|source| CameraError::OpenFailed { index, source })?;
        let opened = capture
            .is_opened()
            .map_err(|source| CameraError::OpenFailed { index, source })?;

        if opened {
            Ok(Some(OpenCvCamera { capture, index }))
        } else {
            Ok(None)
        }
    }
}
