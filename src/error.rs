//! Top-level error type for the analyzer binary.

use thiserror::Error;

use crate::camera::CameraError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("vision error: {0}")]
    Vision(#[from] opencv::Error),

    #[error("failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
