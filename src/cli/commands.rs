//! Subcommand handlers for list-cameras and config actions, and merging of
//! command-line overrides into the loaded configuration.

use std::path::Path;

use super::args::{Args, ConfigAction};
use crate::camera::{list_devices, DeviceOpener, DeviceStatus};
use crate::config::{Config, ConfigError};

/// Apply command-line flags on top of `config` and re-validate.
pub fn apply_overrides(args: &Args, config: &mut Config) -> Result<(), ConfigError> {
    if let Some(device) = args.device {
        config.camera.indices = vec![device];
    }
    if let Some(backend) = args.backend {
        config.camera.backend = backend.into();
    }
    if let Some(resolution) = args.resolution {
        config.camera.width = resolution.width;
        config.camera.height = resolution.height;
    }
    if let Some(fps) = args.fps {
        config.camera.fps = fps;
    }
    if let Some(frames) = args.warmup_frames {
        config.camera.warmup_frames = frames;
    }
    if let Some(max) = args.max_read_errors {
        config.capture.max_read_errors = max;
    }
    if let Some(mode) = args.mode {
        config.filters.initial_mode = mode;
    }
    if let Some(dir) = &args.output_dir {
        config.output.screenshot_dir = dir.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    config.validate()
}

/// Probe the configured indices and print what each one does.
///
/// Returns the number of working cameras.
pub fn list_cameras<O: DeviceOpener>(opener: &mut O, config: &Config) -> usize {
    println!(
        "Probing camera indices {:?} (backend: {})...",
        config.camera.indices, config.camera.backend
    );
    let devices = list_devices(opener, &config.camera.indices, config.camera.probe_delay());
    let working = devices
        .iter()
        .filter(|d| matches!(d.status, DeviceStatus::Working(_)))
        .count();

    println!();
    for device in &devices {
        println!("  {}", device);
    }
    println!();

    if working == 0 {
        println!("No working cameras found.");
        println!("Make sure a camera is connected and not in use by another program.");
        println!("Try a different backend with --backend, or more indices in the config file.");
    } else {
        println!("Use --device <index> to select a camera.");
    }
    working
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    config_path: &Path,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Show => {
            print_config(config);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            Config::init(config_path)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

fn print_config(config: &Config) {
    let cam = &config.camera;
    let filters = &config.filters.settings;
    println!("Current configuration:");
    println!("  Camera indices: {:?}", cam.indices);
    println!("  Backend: {}", cam.backend);
    println!("  Resolution: {} @ {} fps", cam.resolution(), cam.fps);
    println!("  Probe delay: {} ms", cam.probe_delay_ms);
    println!(
        "  Warm-up: {} frames, {} ms apart",
        cam.warmup_frames, cam.warmup_interval_ms
    );
    for (_, name, value) in cam.controls.properties() {
        println!("  Control {}: {}", name, value);
    }
    println!(
        "  Read errors tolerated: {} (retry after {} ms)",
        config.capture.max_read_errors, config.capture.retry_delay_ms
    );
    println!("  Initial mode: {}", config.filters.initial_mode);
    println!("  Blur kernel: {}", filters.blur_kernel);
    println!(
        "  Edge: thresholds {}/{}, blur {}, dilate {}, background {:.2}, color {:?}",
        filters.edge_low_threshold,
        filters.edge_high_threshold,
        filters.edge_blur_kernel,
        if filters.edge_dilate { "yes" } else { "no" },
        filters.edge_background,
        filters.edge_color
    );
    println!(
        "  Screenshots: {} ({})",
        config.output.screenshot_dir.display(),
        config.output.format
    );
    println!("  Window title: {}", config.output.window_title);
}
