//! Device probing, acquisition and warm-up.

use std::thread;
use std::time::Duration;

use opencv::prelude::*;

use super::capture::{DeviceOpener, FrameSource};
use super::frame_utils::mean_brightness;
use super::types::{CameraError, CameraInfo, DeviceStatus, Resolution};

/// Outcome of probing a single device index.
#[derive(Debug)]
pub enum ProbeOutcome<S> {
    /// The device did not open
    OpenFailed,
    /// The device opened but the first read delivered nothing; the handle
    /// has already been released
    NoFrame,
    /// The device delivered a frame and is kept open
    Working { source: S, frame_size: Resolution },
}

impl<S> ProbeOutcome<S> {
    pub fn status(&self) -> DeviceStatus {
        match self {
            Self::OpenFailed => DeviceStatus::Unavailable,
            Self::NoFrame => DeviceStatus::NoFrame,
            Self::Working { frame_size, .. } => DeviceStatus::Working(*frame_size),
        }
    }
}

/// A camera that passed probing.
#[derive(Debug)]
pub struct AcquiredCamera<S> {
    /// Index the camera was found at
    pub index: i32,
    /// Open capture handle
    pub source: S,
    /// Size of the probe frame
    pub frame_size: Resolution,
}

/// Result of the warm-up read sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupReport {
    pub attempted: u32,
    pub delivered: u32,
}

/// Open device `index`, give the driver `init_delay` to settle, and try one read.
pub fn probe_device<O: DeviceOpener>(
    opener: &mut O,
    index: i32,
    init_delay: Duration,
) -> ProbeOutcome<O::Source> {
    let mut source = match opener.open(index) {
        Ok(Some(source)) => source,
        Ok(None) => return ProbeOutcome::OpenFailed,
        Err(e) => {
            log::debug!("camera {}: {}", index, e);
            return ProbeOutcome::OpenFailed;
        }
    };

    if !init_delay.is_zero() {
        thread::sleep(init_delay);
    }

    match source.read_frame() {
        Ok(Some(frame)) => ProbeOutcome::Working {
            source,
            frame_size: Resolution {
                width: frame.cols().max(0) as u32,
                height: frame.rows().max(0) as u32,
            },
        },
        Ok(None) => ProbeOutcome::NoFrame,
        Err(e) => {
            log::debug!("camera {}: first read failed: {}", index, e);
            ProbeOutcome::NoFrame
        }
    }
}

/// Probe `indices` in order and keep the first camera that delivers a frame.
///
/// # Errors
/// * `CameraError::NoWorkingCamera` - if no index yields a frame
pub fn acquire<O: DeviceOpener>(
    opener: &mut O,
    indices: &[i32],
    init_delay: Duration,
) -> Result<AcquiredCamera<O::Source>, CameraError> {
    for &index in indices {
        println!("Trying camera index {}...", index);
        match probe_device(opener, index, init_delay) {
            ProbeOutcome::Working { source, frame_size } => {
                println!("  Camera {} works, frame size {}", index, frame_size);
                return Ok(AcquiredCamera {
                    index,
                    source,
                    frame_size,
                });
            }
            ProbeOutcome::NoFrame => {
                println!("  Camera {} opened but delivered no frame", index);
            }
            ProbeOutcome::OpenFailed => {
                println!("  Camera {} could not be opened", index);
            }
        }
    }

    Err(CameraError::NoWorkingCamera {
        tried: indices.to_vec(),
    })
}

/// Probe every index and report what was found. Devices are released again.
pub fn list_devices<O: DeviceOpener>(
    opener: &mut O,
    indices: &[i32],
    init_delay: Duration,
) -> Vec<CameraInfo> {
    indices
        .iter()
        .map(|&index| CameraInfo {
            index,
            status: probe_device(opener, index, init_delay).status(),
        })
        .collect()
}

/// Read and discard `frames` frames so auto exposure and gain can settle.
pub fn warm_up<S: FrameSource>(source: &mut S, frames: u32, interval: Duration) -> WarmupReport {
    let mut delivered = 0;

    for i in 0..frames {
        match source.read_frame() {
            Ok(Some(frame)) => {
                delivered += 1;
                if i % 10 == 0 {
                    match mean_brightness(&frame) {
                        Ok(mean) => println!("  Warm-up frame {}: mean brightness {:.1}", i, mean),
                        Err(e) => log::debug!("warm-up frame {}: {}", i, e),
                    }
                }
            }
            Ok(None) => log::debug!("warm-up frame {}: no frame", i),
            Err(e) => log::debug!("warm-up frame {}: {}", i, e),
        }

        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    WarmupReport {
        attempted: frames,
        delivered,
    }
}
