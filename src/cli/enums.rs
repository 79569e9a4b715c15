//! CLI enum types.

use clap::ValueEnum;

use crate::camera::CaptureBackend;

/// Video capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    #[default]
    Any,
    Dshow,
    Msmf,
    #[value(name = "v4l2")]
    V4l2,
    Avfoundation,
}

impl From<Backend> for CaptureBackend {
    fn from(b: Backend) -> Self {
        match b {
            Backend::Any => CaptureBackend::Any,
            Backend::Dshow => CaptureBackend::Dshow,
            Backend::Msmf => CaptureBackend::Msmf,
            Backend::V4l2 => CaptureBackend::V4l2,
            Backend::Avfoundation => CaptureBackend::Avfoundation,
        }
    }
}
