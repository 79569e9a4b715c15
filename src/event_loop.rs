//! The synchronous capture / filter / display loop.
//!
//! One iteration reads a frame, runs the active filter, draws the overlay,
//! shows the result and polls the keyboard. Read failures are retried until
//! a consecutive-failure threshold is exceeded. The loop also stops when the
//! shared stop flag is raised, which the Ctrl+C handler does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use opencv::prelude::*;

use crate::camera::{frame_stats, FrameSource};
use crate::display::DisplaySink;
use crate::effects::{apply_filter, FilterMode, FilterSettings};
use crate::error::AppError;
use crate::hotkeys::{map_key, HotkeyEvent};
use crate::overlay::{draw_overlay, readout, FpsCounter};
use crate::screenshot::ScreenshotWriter;

/// Frames whose statistics are logged at debug level
const STATS_FRAMES: u64 = 3;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Quit key pressed
    UserQuit,
    /// Too many consecutive failed reads
    ReadFailures,
    /// Stop flag raised (Ctrl+C)
    Interrupted,
}

impl ExitReason {
    /// Whether the process should exit with a failure status.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ReadFailures)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminating(ExitReason),
}

/// Counts consecutive failed reads.
#[derive(Debug, Clone, Copy)]
pub struct ReadErrorCounter {
    count: u32,
    threshold: u32,
}

impl ReadErrorCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            count: 0,
            threshold,
        }
    }

    /// Record one failure. Returns true once the count exceeds the threshold.
    pub fn record_failure(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count > self.threshold
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

/// Timing and tolerance knobs for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub max_read_errors: u32,
    pub retry_delay: Duration,
    pub key_wait: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_read_errors: 10,
            retry_delay: Duration::from_millis(100),
            key_wait: Duration::from_millis(1),
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub reason: ExitReason,
    pub frames: u64,
    pub screenshots: u32,
}

/// Frame loop over a borrowed source and display.
pub struct FrameLoop<'a, S: FrameSource, D: DisplaySink> {
    source: &'a mut S,
    display: &'a mut D,
    writer: &'a ScreenshotWriter,
    stop: &'a AtomicBool,
    filters: FilterSettings,
    settings: LoopSettings,
    mode: FilterMode,
    errors: ReadErrorCounter,
    fps: FpsCounter,
    state: LoopState,
    frames: u64,
    screenshots: u32,
}

impl<'a, S: FrameSource, D: DisplaySink> FrameLoop<'a, S, D> {
    pub fn new(
        source: &'a mut S,
        display: &'a mut D,
        writer: &'a ScreenshotWriter,
        stop: &'a AtomicBool,
    ) -> Self {
        let settings = LoopSettings::default();
        Self {
            source,
            display,
            writer,
            stop,
            filters: FilterSettings::default(),
            settings,
            mode: FilterMode::default(),
            errors: ReadErrorCounter::new(settings.max_read_errors),
            fps: FpsCounter::new(0.0),
            state: LoopState::Running,
            frames: 0,
            screenshots: 0,
        }
    }

    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_filters(mut self, filters: FilterSettings) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_settings(mut self, settings: LoopSettings) -> Self {
        self.settings = settings;
        self.errors = ReadErrorCounter::new(settings.max_read_errors);
        self
    }

    /// Frame rate shown until the first measurement window completes.
    pub fn with_nominal_fps(mut self, fps: f64) -> Self {
        self.fps = FpsCounter::new(fps);
        self
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn read_errors(&self) -> u32 {
        self.errors.count()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn screenshots(&self) -> u32 {
        self.screenshots
    }

    /// Run one iteration and return the resulting state.
    ///
    /// Vision and display errors are fatal and propagate; read failures are not.
    pub fn step(&mut self) -> Result<LoopState, AppError> {
        if self.state != LoopState::Running {
            return Ok(self.state);
        }
        if self.stop.load(Ordering::SeqCst) {
            self.state = LoopState::Terminating(ExitReason::Interrupted);
            return Ok(self.state);
        }

        let frame = match self.source.read_frame() {
            Ok(Some(frame)) if !frame.empty() => frame,
            Ok(_) => return Ok(self.read_failed("no frame received")),
            Err(e) => return Ok(self.read_failed(&e.to_string())),
        };
        self.errors.reset();
        self.frames += 1;

        if self.frames <= STATS_FRAMES {
            match frame_stats(&frame) {
                Ok(Some(stats)) => log::debug!(
                    "frame {}: {}x{}x{} min={} max={} mean={:.1}",
                    self.frames,
                    frame.cols(),
                    frame.rows(),
                    frame.channels(),
                    stats.min,
                    stats.max,
                    stats.mean
                ),
                Ok(None) => {}
                Err(e) => log::debug!("frame {}: no stats: {}", self.frames, e),
            }
        }

        let mut processed = apply_filter(self.mode, &frame, &self.filters)?;
        let fps = self.fps.tick();
        let text = readout(processed.image.cols(), processed.image.rows(), fps);
        draw_overlay(&mut processed.image, processed.label, &text)?;
        self.display.show(&processed.image)?;

        if let Some(code) = self.display.poll_key(self.settings.key_wait)? {
            match map_key(code) {
                Some(event) => self.handle(event, &processed.image),
                None => log::debug!("ignoring key code {}", code),
            }
        }

        Ok(self.state)
    }

    /// Step until the loop terminates.
    pub fn run(mut self) -> Result<LoopSummary, AppError> {
        loop {
            if let LoopState::Terminating(reason) = self.step()? {
                log::info!(
                    "frame loop finished ({:?}) after {} frames",
                    reason,
                    self.frames
                );
                return Ok(LoopSummary {
                    reason,
                    frames: self.frames,
                    screenshots: self.screenshots,
                });
            }
        }
    }

    fn read_failed(&mut self, cause: &str) -> LoopState {
        if self.errors.record_failure() {
            eprintln!(
                "Could not read a frame {} times in a row ({}), stopping",
                self.errors.count(),
                cause
            );
            self.state = LoopState::Terminating(ExitReason::ReadFailures);
        } else {
            println!(
                "Failed to read frame ({}/{}): {}, retrying...",
                self.errors.count(),
                self.errors.threshold(),
                cause
            );
            if !self.settings.retry_delay.is_zero() {
                thread::sleep(self.settings.retry_delay);
            }
        }
        self.state
    }

    fn handle(&mut self, event: HotkeyEvent, displayed: &Mat) {
        match event {
            HotkeyEvent::SetMode(mode) => {
                if mode != self.mode {
                    println!("Mode: {}", mode.label());
                    log::info!("filter mode {} -> {}", self.mode, mode);
                }
                self.mode = mode;
            }
            HotkeyEvent::Screenshot => match self.writer.save(displayed) {
                Ok(path) => {
                    self.screenshots += 1;
                    println!("Screenshot saved: {}", path.display());
                }
                Err(e) => eprintln!("Screenshot failed: {}", e),
            },
            HotkeyEvent::Quit => {
                println!("Quitting...");
                self.state = LoopState::Terminating(ExitReason::UserQuit);
            }
        }
    }
}

/// Install the Ctrl+C handler and return the flag it raises.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })?;
    Ok(flag)
}
