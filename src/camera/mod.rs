//! Camera module: device probing, acquisition and frame capture.
//!
//! This module provides the acquisition half of the program:
//! - Probing candidate indices via [`acquire`] and [`list_devices`]
//! - The [`FrameSource`] trait the frame loop reads through, implemented
//!   for real devices by [`OpenCvCamera`]
//! - Warm-up reads via [`warm_up`]
//! - Configuration via [`CameraSettings`] and [`Resolution`]

mod capture;
mod device;
mod frame_utils;
mod types;

pub use capture::{DeviceOpener, FrameSource, OpenCvCamera, OpenCvOpener};
pub use device::{
    acquire, list_devices, probe_device, warm_up, AcquiredCamera, ProbeOutcome, WarmupReport,
};
pub use frame_utils::{frame_stats, mean_brightness, FrameStats};
pub use types::{
    CameraControls, CameraError, CameraInfo, CameraSettings, CaptureBackend, DeviceStatus,
    Resolution,
};
