//! Fake devices and synthetic frames for unit tests.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use opencv::core::{self, Mat, Scalar, Vec3b, CV_8UC3};
use opencv::prelude::*;

use crate::camera::{CameraError, CameraSettings, DeviceOpener, FrameSource, Resolution};
use crate::display::DisplaySink;

/// Uniformly colored BGR frame.
pub fn solid_frame(rows: i32, cols: i32) -> Mat {
    Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(40.0, 80.0, 120.0, 0.0))
        .unwrap()
}

/// Frame with a smooth color gradient and a bright square in the middle,
/// so every filter has structure to work on.
pub fn pattern_frame(rows: i32, cols: i32) -> Mat {
    let mut frame = solid_frame(rows, cols);
    for y in 0..rows {
        for x in 0..cols {
            let inside = y >= rows / 4 && y < rows * 3 / 4 && x >= cols / 4 && x < cols * 3 / 4;
            let px = if inside {
                Vec3b::from([230, 240, 250])
            } else {
                Vec3b::from([
                    ((x * 3) % 120) as u8,
                    ((y * 5) % 120) as u8,
                    (((x + y) * 2) % 120) as u8,
                ])
            };
            *frame.at_2d_mut::<Vec3b>(y, x).unwrap() = px;
        }
    }
    frame
}

/// Scripted frame source.
#[derive(Debug, Default)]
pub struct FakeSource {
    script: VecDeque<Option<Mat>>,
    repeat: Option<Mat>,
    pub reads: usize,
    pub applied: Option<CameraSettings>,
}

impl FakeSource {
    /// Delivers a copy of `frame` on every read.
    pub fn repeating(frame: Mat) -> Self {
        Self {
            repeat: Some(frame),
            ..Default::default()
        }
    }

    /// Never delivers a frame.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Plays `script` once, then delivers nothing.
    pub fn scripted(script: Vec<Option<Mat>>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }
}

impl FrameSource for FakeSource {
    fn read_frame(&mut self) -> Result<Option<Mat>, CameraError> {
        self.reads += 1;
        if let Some(next) = self.script.pop_front() {
            return Ok(next);
        }
        match &self.repeat {
            Some(frame) => Ok(Some(frame.try_clone().map_err(CameraError::ReadFailed)?)),
            None => Ok(None),
        }
    }

    fn apply_settings(&mut self, settings: &CameraSettings) -> Result<(), CameraError> {
        self.applied = Some(settings.clone());
        Ok(())
    }

    fn negotiated(&self) -> Result<(Resolution, f64), CameraError> {
        let resolution = self
            .applied
            .as_ref()
            .map(|s| s.resolution)
            .unwrap_or_default();
        Ok((resolution, 30.0))
    }
}

/// How a fake device behaves when opened.
#[derive(Debug)]
pub enum ScriptedDevice {
    Unavailable,
    OpenError,
    Opens(FakeSource),
}

/// Opener over a fixed set of scripted devices. Each device opens once.
#[derive(Debug, Default)]
pub struct FakeOpener {
    devices: HashMap<i32, ScriptedDevice>,
    /// Indices that were opened successfully, in order
    pub opened: Vec<i32>,
}

impl FakeOpener {
    pub fn new(devices: Vec<(i32, ScriptedDevice)>) -> Self {
        Self {
            devices: devices.into_iter().collect(),
            opened: Vec::new(),
        }
    }
}

impl DeviceOpener for FakeOpener {
    type Source = FakeSource;

    fn open(&mut self, index: i32) -> Result<Option<FakeSource>, CameraError> {
        match self.devices.remove(&index) {
            Some(ScriptedDevice::Opens(source)) => {
                self.opened.push(index);
                Ok(Some(source))
            }
            Some(ScriptedDevice::OpenError) => Err(CameraError::OpenFailed {
                index,
                source: opencv::Error::new(core::StsError, "scripted open failure"),
            }),
            Some(ScriptedDevice::Unavailable) | None => Ok(None),
        }
    }
}

/// Display that keeps every frame it was shown and replays a key script,
/// one entry per poll. `None` entries stand for polls where no key was
/// pressed; once the script runs out every poll returns `None`.
#[derive(Debug, Default)]
pub struct FakeDisplay {
    keys: VecDeque<Option<i32>>,
    pub frames: Vec<Mat>,
}

impl FakeDisplay {
    pub fn with_keys(keys: &[Option<char>]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.map(|c| c as i32)).collect(),
            frames: Vec::new(),
        }
    }
}

impl DisplaySink for FakeDisplay {
    fn show(&mut self, frame: &Mat) -> opencv::Result<()> {
        self.frames.push(frame.try_clone()?);
        Ok(())
    }

    fn poll_key(&mut self, _wait: Duration) -> opencv::Result<Option<i32>> {
        Ok(self.keys.pop_front().flatten())
    }
}
