//! Keyboard commands read from the display window.
//!
//! Keys arrive as raw codes from the window's key polling. Only the low byte
//! is significant; some backends set modifier bits above it.

use crate::effects::FilterMode;

/// Represents a hotkey event that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Switch the active filter
    SetMode(FilterMode),
    /// Save the displayed frame to disk
    Screenshot,
    /// Leave the frame loop
    Quit,
}

/// Key bindings, in the order they are listed to the user.
pub const KEY_BINDINGS: [(char, HotkeyEvent); 10] = [
    ('q', HotkeyEvent::Quit),
    ('c', HotkeyEvent::SetMode(FilterMode::Color)),
    ('g', HotkeyEvent::SetMode(FilterMode::Grayscale)),
    ('e', HotkeyEvent::SetMode(FilterMode::Edge)),
    ('b', HotkeyEvent::SetMode(FilterMode::Blur)),
    ('m', HotkeyEvent::SetMode(FilterMode::MirrorHorizontal)),
    ('n', HotkeyEvent::SetMode(FilterMode::MirrorVertical)),
    ('o', HotkeyEvent::SetMode(FilterMode::MirrorBoth)),
    ('s', HotkeyEvent::Screenshot),
    // Esc
    ('\u{1b}', HotkeyEvent::Quit),
];

/// Map a raw key code to a hotkey. Unmapped keys and "no key" (negative
/// codes) yield `None`.
pub fn map_key(code: i32) -> Option<HotkeyEvent> {
    if code < 0 {
        return None;
    }
    let key = (code & 0xFF) as u8;
    KEY_BINDINGS
        .iter()
        .find(|(c, _)| *c == key as char)
        .map(|(_, event)| *event)
}

/// Describe what a hotkey does, for the startup help.
pub fn describe(event: HotkeyEvent) -> String {
    match event {
        HotkeyEvent::SetMode(mode) => format!("switch to {}", mode.label()),
        HotkeyEvent::Screenshot => "save a screenshot".to_string(),
        HotkeyEvent::Quit => "quit".to_string(),
    }
}

/// Print the key bindings to stdout.
pub fn print_key_help() {
    println!("Keys (press in the video window):");
    for (key, event) in KEY_BINDINGS.iter().filter(|(k, _)| k.is_ascii_graphic()) {
        println!("  {}  {}", key, describe(*event));
    }
    println!("  Esc also quits");
}
