//! Frame inspection helpers used for diagnostics.

use opencv::core::{self, Mat};
use opencv::prelude::*;

/// Sample statistics of a frame across all channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub min: u8,
    pub max: u8,
    pub mean: f64,
}

/// Mean sample value across all channels of an 8-bit frame.
pub fn mean_brightness(frame: &Mat) -> opencv::Result<f64> {
    let channels = frame.channels().clamp(1, 4) as usize;
    let means = core::mean(frame, &core::no_array())?;
    Ok(means.0[..channels].iter().sum::<f64>() / channels as f64)
}

/// Min, max and mean sample value of an 8-bit frame.
///
/// Returns `None` for an empty frame.
pub fn frame_stats(frame: &Mat) -> opencv::Result<Option<FrameStats>> {
    if frame.empty() {
        return Ok(None);
    }

    let owned;
    let frame = if frame.is_continuous() {
        frame
    } else {
        owned = frame.try_clone()?;
        &owned
    };

    let bytes = frame.data_bytes()?;
    let (min, max) = bytes
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &b| (lo.min(b), hi.max(b)));
    let mean = bytes.iter().map(|&b| f64::from(b)).sum::<f64>() / bytes.len() as f64;

    Ok(Some(FrameStats { min, max, mean }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};

    #[test]
    fn test_mean_brightness_uniform_frame() {
        let frame = Mat::new_rows_cols_with_default(4, 4, CV_8UC3, Scalar::new(30.0, 60.0, 90.0, 0.0))
            .unwrap();
        let mean = mean_brightness(&frame).unwrap();
        assert!((mean - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_stats() {
        let mut frame = Mat::new_rows_cols_with_default(2, 2, CV_8UC3, Scalar::all(10.0)).unwrap();
        *frame.at_2d_mut::<Vec3b>(1, 1).unwrap() = Vec3b::from([250, 10, 10]);

        let stats = frame_stats(&frame).unwrap().unwrap();
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 250);
        // 12 samples: eleven 10s and one 250
        assert!((stats.mean - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_stats_empty() {
        assert!(frame_stats(&Mat::default()).unwrap().is_none());
    }
}
