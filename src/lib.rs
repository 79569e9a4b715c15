//! webcam-analyzer library crate.
//!
//! Camera acquisition, the per-frame filters, and the synchronous frame loop
//! that ties them to a display window. The binary wires these to the command
//! line; the pieces are public so they can be driven with fake devices.

pub mod camera;
pub mod cli;
pub mod config;
pub mod display;
pub mod effects;
pub mod error;
pub mod event_loop;
pub mod hotkeys;
pub mod overlay;
pub mod screenshot;

#[cfg(test)]
mod testing;
