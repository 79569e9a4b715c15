//! Text annotations drawn onto each displayed frame.

use std::time::{Duration, Instant};

use opencv::core::{Mat, Point, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

/// Text color (BGR green)
fn text_color() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

/// Anchor of the mode label
pub const LABEL_ORIGIN: (i32, i32) = (10, 30);

/// Anchor of the resolution / frame rate readout
pub const READOUT_ORIGIN: (i32, i32) = (10, 60);

/// Draw the mode label and the resolution / fps readout onto `frame`.
pub fn draw_overlay(frame: &mut Mat, label: &str, readout: &str) -> opencv::Result<()> {
    imgproc::put_text(
        frame,
        label,
        Point::new(LABEL_ORIGIN.0, LABEL_ORIGIN.1),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        text_color(),
        2,
        imgproc::LINE_8,
        false,
    )?;
    imgproc::put_text(
        frame,
        readout,
        Point::new(READOUT_ORIGIN.0, READOUT_ORIGIN.1),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        text_color(),
        2,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

/// Readout text for a frame of `width` x `height` at `fps`.
pub fn readout(width: i32, height: i32, fps: f64) -> String {
    format!("Resolution: {}x{} | {:.1} fps", width, height, fps)
}

/// Frame rate measured over a rolling window.
///
/// Reports the nominal rate until the first window completes.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    current: f64,
}

impl FpsCounter {
    pub fn new(nominal: f64) -> Self {
        Self::with_window(nominal, Duration::from_secs(1))
    }

    pub fn with_window(nominal: f64, window: Duration) -> Self {
        Self {
            window,
            window_start: Instant::now(),
            frames: 0,
            current: nominal,
        }
    }

    /// Count one frame and return the current estimate.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window && !elapsed.is_zero() {
            self.current = f64::from(self.frames) / elapsed.as_secs_f64();
            self.frames = 0;
            self.window_start = now;
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::solid_frame;

    #[test]
    fn test_readout_format() {
        assert_eq!(readout(640, 480, 29.97), "Resolution: 640x480 | 30.0 fps");
    }

    #[test]
    fn test_draw_overlay_marks_frame_in_place() {
        let mut frame = solid_frame(80, 320);
        let before = frame.try_clone().unwrap();

        draw_overlay(&mut frame, "Original", &readout(320, 80, 30.0)).unwrap();

        assert_eq!(frame.rows(), 80);
        assert_eq!(frame.cols(), 320);
        assert_ne!(frame.data_bytes().unwrap(), before.data_bytes().unwrap());
    }

    #[test]
    fn test_fps_counter_reports_nominal_before_first_window() {
        let mut counter = FpsCounter::new(30.0);
        assert_eq!(counter.current, 30.0);
        let start = counter.window_start;
        assert_eq!(counter.tick_at(start + Duration::from_millis(100)), 30.0);
    }

    #[test]
    fn test_fps_counter_measures_window() {
        let mut counter = FpsCounter::with_window(30.0, Duration::from_secs(1));
        let start = counter.window_start;
        for i in 1..10 {
            counter.tick_at(start + Duration::from_millis(i * 100));
        }
        let fps = counter.tick_at(start + Duration::from_secs(2));
        // 10 frames over 2 seconds
        assert!((fps - 5.0).abs() < 1e-9);
        assert_eq!(counter.frames, 0);
    }
}
