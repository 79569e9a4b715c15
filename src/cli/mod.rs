//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{parse_format, parse_framerate, parse_mode, parse_resolution};
pub use args::{Args, Command, ConfigAction};
pub use commands::{apply_overrides, handle_config_action, list_cameras};
pub use enums::Backend;
