//! Window output and keyboard polling.

use std::time::Duration;

use opencv::core::Mat;
use opencv::highgui;

/// Where processed frames go, and where key presses come from.
pub trait DisplaySink {
    /// Show `frame`, replacing whatever was shown before.
    fn show(&mut self, frame: &Mat) -> opencv::Result<()>;

    /// Wait up to `wait` for a key press. Returns the raw key code, or `None`
    /// when no key was pressed.
    fn poll_key(&mut self, wait: Duration) -> opencv::Result<Option<i32>>;
}

/// A single HighGUI window. Destroyed when dropped.
#[derive(Debug)]
pub struct HighGuiWindow {
    title: String,
}

impl HighGuiWindow {
    pub fn open(title: &str) -> opencv::Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
        log::debug!("window '{}' created", title);
        Ok(Self {
            title: title.to_string(),
        })
    }
}

impl DisplaySink for HighGuiWindow {
    fn show(&mut self, frame: &Mat) -> opencv::Result<()> {
        highgui::imshow(&self.title, frame)
    }

    fn poll_key(&mut self, wait: Duration) -> opencv::Result<Option<i32>> {
        // wait_key(0) blocks forever
        let ms = i32::try_from(wait.as_millis()).unwrap_or(i32::MAX).max(1);
        let key = highgui::wait_key(ms)?;
        Ok((key >= 0).then_some(key))
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.title) {
            log::warn!("failed to close window '{}': {}", self.title, e);
        }
    }
}
