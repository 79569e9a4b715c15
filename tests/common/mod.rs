//! Shared fakes for the integration tests: a scripted camera, a scripted
//! opener and a display that records frames and replays key presses.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use opencv::core::{Mat, Scalar, Vec3b, CV_8UC3};
use opencv::prelude::*;
use webcam_analyzer::camera::{
    CameraError, CameraSettings, DeviceOpener, FrameSource, Resolution,
};
use webcam_analyzer::display::DisplaySink;

/// Frame with a dark gradient background and a bright centered square.
pub fn test_frame(rows: i32, cols: i32) -> Mat {
    let mut frame =
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0)).unwrap();
    for y in 0..rows {
        for x in 0..cols {
            let inside = y >= rows / 4 && y < rows * 3 / 4 && x >= cols / 4 && x < cols * 3 / 4;
            let px = if inside {
                Vec3b::from([220, 220, 220])
            } else {
                Vec3b::from([(x % 100) as u8, (y % 100) as u8, 50])
            };
            *frame.at_2d_mut::<Vec3b>(y, x).unwrap() = px;
        }
    }
    frame
}

/// Camera that plays a script of reads, then optionally repeats one frame.
#[derive(Default)]
pub struct ScriptedCamera {
    script: VecDeque<Option<Mat>>,
    repeat: Option<Mat>,
    pub reads: usize,
}

impl ScriptedCamera {
    pub fn new(script: Vec<Option<Mat>>, repeat: Option<Mat>) -> Self {
        Self {
            script: script.into(),
            repeat,
            reads: 0,
        }
    }
}

impl FrameSource for ScriptedCamera {
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

    fn apply_settings(&mut self, _settings: &CameraSettings) -> Result<(), CameraError> {
        Ok(())
    }

    fn negotiated(&self) -> Result<(Resolution, f64), CameraError> {
        Ok((Resolution::default(), 30.0))
    }
}

/// Opener handing out pre-built cameras by index.
#[derive(Default)]
pub struct ScriptedOpener {
    cameras: HashMap<i32, ScriptedCamera>,
    pub attempts: Vec<i32>,
}

impl ScriptedOpener {
    pub fn new(cameras: Vec<(i32, ScriptedCamera)>) -> Self {
        Self {
            cameras: cameras.into_iter().collect(),
            attempts: Vec::new(),
        }
    }
}

impl DeviceOpener for ScriptedOpener {
    type Source = ScriptedCamera;

    fn open(&mut self, index: i32) -> Result<Option<ScriptedCamera>, CameraError> {
        self.attempts.push(index);
        Ok(self.cameras.remove(&index))
    }
}

/// Display that keeps every shown frame and replays key codes.
#[derive(Default)]
pub struct RecordingDisplay {
    keys: VecDeque<Option<i32>>,
    pub frames: Vec<Mat>,
}

impl RecordingDisplay {
    /// `None` entries are iterations without a key press.
    pub fn with_keys(keys: &[Option<char>]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.map(|c| c as i32)).collect(),
            frames: Vec::new(),
        }
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, frame: &Mat) -> opencv::Result<()> {
        self.frames.push(frame.try_clone()?);
        Ok(())
    }

    fn poll_key(&mut self, _wait: Duration) -> opencv::Result<Option<i32>> {
        // Quit once the script runs out so a test can never spin forever
        Ok(self.keys.pop_front().unwrap_or(Some('q' as i32)))
    }
}
