//! Saving displayed frames to disk.

use std::fmt;
use std::path::PathBuf;

use opencv::core::{Mat, Vector};
use opencv::imgcodecs;
use serde::Deserialize;
use thiserror::Error;

/// Errors from saving a screenshot.
#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("cannot create screenshot directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        source: opencv::Error,
    },

    #[error("encoder refused to write '{}'", path.display())]
    Rejected { path: PathBuf },
}

/// Screenshot file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    /// Parse format name from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes timestamped screenshots into one directory.
///
/// The directory is created on the first save, not up front.
#[derive(Debug, Clone)]
pub struct ScreenshotWriter {
    dir: PathBuf,
    format: ImageFormat,
}

impl ScreenshotWriter {
    pub fn new(dir: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Encode `frame` into a new file and return its path.
    pub fn save(&self, frame: &Mat) -> Result<PathBuf, ScreenshotError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ScreenshotError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
        let path = self.unused_path(&stamp);

        let written = imgcodecs::imwrite(&path.to_string_lossy(), frame, &Vector::new())
            .map_err(|e| ScreenshotError::Encode {
                path: path.clone(),
                source: e,
            })?;
        if !written {
            return Err(ScreenshotError::Rejected { path });
        }

        log::info!("screenshot written to {}", path.display());
        Ok(path)
    }

    /// First free name for `stamp`, adding `_1`, `_2`, ... on collision.
    fn unused_path(&self, stamp: &str) -> PathBuf {
        let ext = self.format.extension();
        let mut path = self.dir.join(format!("screenshot_{}.{}", stamp, ext));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("screenshot_{}_{}.{}", stamp, n, ext));
            n += 1;
        }
        path
    }
}
