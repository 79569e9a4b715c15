//! Filter modes and the per-frame transforms behind them.
//!
//! Every transform is a pure function from an input frame to a new frame of
//! the same size and type. The frame loop owns the active [`FilterMode`] and
//! hands it to [`apply_filter`] once per frame.

use opencv::core::{self, Mat, Scalar, Size};
use opencv::imgproc;
use opencv::prelude::*;
use serde::Deserialize;

/// Filter applied to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Unmodified camera image
    #[default]
    Color,
    /// Desaturated image, re-expanded to three channels
    Grayscale,
    /// Canny edges highlighted over a dimmed original
    Edge,
    /// Gaussian smoothing of the color image
    Blur,
    /// Left-right reflection
    MirrorHorizontal,
    /// Top-bottom reflection
    MirrorVertical,
    /// Reflection around both axes
    MirrorBoth,
}

/// Signature shared by all per-mode transforms.
type Transform = fn(&Mat, &FilterSettings) -> opencv::Result<Mat>;

impl FilterMode {
    /// Every mode, in key-help order.
    pub const ALL: [FilterMode; 7] = [
        FilterMode::Color,
        FilterMode::Grayscale,
        FilterMode::Edge,
        FilterMode::Blur,
        FilterMode::MirrorHorizontal,
        FilterMode::MirrorVertical,
        FilterMode::MirrorBoth,
    ];

    /// Parse mode name from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "color" | "colour" | "original" => Some(Self::Color),
            "grayscale" | "greyscale" | "gray" | "grey" => Some(Self::Grayscale),
            "edge" | "edges" | "canny" => Some(Self::Edge),
            "blur" => Some(Self::Blur),
            "mirror-horizontal" | "mirror_horizontal" | "mirror" => Some(Self::MirrorHorizontal),
            "mirror-vertical" | "mirror_vertical" => Some(Self::MirrorVertical),
            "mirror-both" | "mirror_both" => Some(Self::MirrorBoth),
            _ => None,
        }
    }

    /// Label drawn onto the frame while this mode is active.
    pub fn label(self) -> &'static str {
        match self {
            Self::Color => "Original",
            Self::Grayscale => "Grayscale",
            Self::Edge => "Edge Detection",
            Self::Blur => "Blur Effect",
            Self::MirrorHorizontal => "Mirror (horizontal)",
            Self::MirrorVertical => "Mirror (vertical)",
            Self::MirrorBoth => "Mirror (both)",
        }
    }

    fn transform(self) -> Transform {
        match self {
            Self::Color => passthrough,
            Self::Grayscale => grayscale,
            Self::Edge => edge_highlight,
            Self::Blur => blur,
            Self::MirrorHorizontal => mirror_horizontal,
            Self::MirrorVertical => mirror_vertical,
            Self::MirrorBoth => mirror_both,
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Color => "color",
            Self::Grayscale => "grayscale",
            Self::Edge => "edge",
            Self::Blur => "blur",
            Self::MirrorHorizontal => "mirror-horizontal",
            Self::MirrorVertical => "mirror-vertical",
            Self::MirrorBoth => "mirror-both",
        };
        f.write_str(name)
    }
}

/// Tuning constants for the filters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Gaussian kernel size for blur mode (odd)
    pub blur_kernel: i32,
    /// Lower Canny hysteresis threshold
    pub edge_low_threshold: f64,
    /// Upper Canny hysteresis threshold
    pub edge_high_threshold: f64,
    /// Gaussian kernel size used to suppress noise before Canny (odd)
    pub edge_blur_kernel: i32,
    /// Thicken detected edges before compositing
    pub edge_dilate: bool,
    /// Structuring element size for edge dilation (odd)
    pub edge_dilate_kernel: i32,
    /// Brightness factor applied to the background in edge mode (0.0-1.0)
    pub edge_background: f64,
    /// Edge highlight color as RGB
    pub edge_color: [u8; 3],
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            blur_kernel: 15,
            edge_low_threshold: 100.0,
            edge_high_threshold: 200.0,
            edge_blur_kernel: 5,
            edge_dilate: true,
            edge_dilate_kernel: 3,
            edge_background: 0.4,
            edge_color: [0, 255, 0],
        }
    }
}

impl FilterSettings {
    /// Check that every value is usable by the vision library.
    pub fn validate(&self) -> Result<(), String> {
        for (name, k) in [
            ("blur_kernel", self.blur_kernel),
            ("edge_blur_kernel", self.edge_blur_kernel),
            ("edge_dilate_kernel", self.edge_dilate_kernel),
        ] {
            if k <= 0 || k % 2 == 0 {
                return Err(format!("{} must be a positive odd number, got {}", name, k));
            }
        }
        if !self.edge_low_threshold.is_finite()
            || !self.edge_high_threshold.is_finite()
            || self.edge_low_threshold < 0.0
            || self.edge_low_threshold > self.edge_high_threshold
        {
            return Err(format!(
                "edge thresholds must satisfy 0 <= low <= high, got {} and {}",
                self.edge_low_threshold, self.edge_high_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.edge_background) {
            return Err(format!(
                "edge_background must be between 0.0 and 1.0, got {}",
                self.edge_background
            ));
        }
        Ok(())
    }

    /// Highlight color in the BGR order frames use.
    pub fn highlight_bgr(&self) -> Scalar {
        let [r, g, b] = self.edge_color;
        Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0)
    }
}

/// Output of one filter pass.
#[derive(Debug)]
pub struct ProcessedFrame {
    pub image: Mat,
    pub label: &'static str,
}

/// Run `mode` over `frame`. The input is left untouched.
pub fn apply_filter(
    mode: FilterMode,
    frame: &Mat,
    settings: &FilterSettings,
) -> opencv::Result<ProcessedFrame> {
    let transform = mode.transform();
    Ok(ProcessedFrame {
        image: transform(frame, settings)?,
        label: mode.label(),
    })
}

/// Scale every sample of `frame` by `factor`.
pub fn dim_background(frame: &Mat, factor: f64) -> opencv::Result<Mat> {
    let mut dimmed = Mat::default();
    frame.convert_to(&mut dimmed, -1, factor, 0.0)?;
    Ok(dimmed)
}

fn to_gray(frame: &Mat) -> opencv::Result<Mat> {
    if frame.channels() == 1 {
        return frame.try_clone();
    }
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

fn passthrough(frame: &Mat, _settings: &FilterSettings) -> opencv::Result<Mat> {
    frame.try_clone()
}

fn grayscale(frame: &Mat, _settings: &FilterSettings) -> opencv::Result<Mat> {
    let gray = to_gray(frame)?;
    let mut expanded = Mat::default();
    imgproc::cvt_color_def(&gray, &mut expanded, imgproc::COLOR_GRAY2BGR)?;
    Ok(expanded)
}

fn edge_highlight(frame: &Mat, settings: &FilterSettings) -> opencv::Result<Mat> {
    let gray = to_gray(frame)?;

    let mut smoothed = Mat::default();
    let k = settings.edge_blur_kernel;
    imgproc::gaussian_blur_def(&gray, &mut smoothed, Size::new(k, k), 0.0)?;

    let mut edges = Mat::default();
    imgproc::canny_def(
        &smoothed,
        &mut edges,
        settings.edge_low_threshold,
        settings.edge_high_threshold,
    )?;

    let mask = if settings.edge_dilate {
        let k = settings.edge_dilate_kernel;
        let kernel = imgproc::get_structuring_element_def(imgproc::MORPH_RECT, Size::new(k, k))?;
        let mut thick = Mat::default();
        imgproc::dilate_def(&edges, &mut thick, &kernel)?;
        thick
    } else {
        edges
    };

    let mut composite = dim_background(frame, settings.edge_background)?;
    let highlight = Mat::new_rows_cols_with_default(
        frame.rows(),
        frame.cols(),
        frame.typ(),
        settings.highlight_bgr(),
    )?;
    highlight.copy_to_masked(&mut composite, &mask)?;
    Ok(composite)
}

fn blur(frame: &Mat, settings: &FilterSettings) -> opencv::Result<Mat> {
    let mut blurred = Mat::default();
    let k = settings.blur_kernel;
    imgproc::gaussian_blur_def(frame, &mut blurred, Size::new(k, k), 0.0)?;
    Ok(blurred)
}

fn flip(frame: &Mat, code: i32) -> opencv::Result<Mat> {
    let mut flipped = Mat::default();
    core::flip(frame, &mut flipped, code)?;
    Ok(flipped)
}

fn mirror_horizontal(frame: &Mat, _settings: &FilterSettings) -> opencv::Result<Mat> {
    flip(frame, 1)
}

fn mirror_vertical(frame: &Mat, _settings: &FilterSettings) -> opencv::Result<Mat> {
    flip(frame, 0)
}

fn mirror_both(frame: &Mat, _settings: &FilterSettings) -> opencv::Result<Mat> {
    flip(frame, -1)
}
