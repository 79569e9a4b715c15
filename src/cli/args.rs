//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Backend;
use crate::camera::Resolution;
use crate::config::{MAX_FPS, MAX_HEIGHT, MAX_WIDTH};
use crate::effects::FilterMode;
use crate::screenshot::ImageFormat;

/// Parse and validate resolution (WIDTHxHEIGHT format)
pub fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 1280x720)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in resolution", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in resolution", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Resolution width and height must be greater than 0".to_string());
    }
    if width > MAX_WIDTH || height > MAX_HEIGHT {
        return Err(format!(
            "Resolution exceeds maximum supported ({}x{})",
            MAX_WIDTH, MAX_HEIGHT
        ));
    }
    Ok(Resolution { width, height })
}

/// Parse and validate framerate (1-120 fps)
pub fn parse_framerate(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !(1..=MAX_FPS).contains(&fps) {
        return Err(format!(
            "Framerate must be between 1 and {} fps, got {}",
            MAX_FPS, fps
        ));
    }
    Ok(fps)
}

/// Parse filter mode name
pub fn parse_mode(s: &str) -> Result<FilterMode, String> {
    FilterMode::from_str(s).ok_or_else(|| {
        let names: Vec<String> = FilterMode::ALL.iter().map(|m| m.to_string()).collect();
        format!("Unknown mode '{}'. Available modes: {}", s, names.join(", "))
    })
}

/// Parse screenshot format name
pub fn parse_format(s: &str) -> Result<ImageFormat, String> {
    ImageFormat::from_str(s)
        .ok_or_else(|| format!("Unknown format '{}'. Available formats: jpg, png", s))
}

/// Live webcam viewer with switchable filters
#[derive(Parser, Debug)]
#[command(name = "webcam-analyzer")]
#[command(version, about = "Live webcam viewer with switchable filters", long_about = None)]
#[command(after_help = "KEYS (in the video window):
    q / Esc  quit
    c        original colors
    g        grayscale
    e        edge detection
    b        blur
    m / n / o  mirror horizontal / vertical / both
    s        save a screenshot")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Probe only this camera index instead of the configured list
    #[arg(short, long)]
    pub device: Option<i32>,

    /// Capture backend
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Capture resolution as WIDTHxHEIGHT
    #[arg(short, long, value_parser = parse_resolution)]
    pub resolution: Option<Resolution>,

    /// Requested frame rate (1-120)
    #[arg(long, value_parser = parse_framerate)]
    pub fps: Option<u32>,

    /// Filter mode at startup
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<FilterMode>,

    /// Directory screenshots are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Screenshot format (jpg or png)
    #[arg(long, value_parser = parse_format)]
    pub format: Option<ImageFormat>,

    /// Frames discarded before the loop starts
    #[arg(long)]
    pub warmup_frames: Option<u32>,

    /// Consecutive failed reads tolerated before exiting
    #[arg(long)]
    pub max_read_errors: Option<u32>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe camera indices and report what each one does
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["webcam-analyzer"]);
        assert!(args.command.is_none());
        assert!(args.device.is_none());
        assert!(args.backend.is_none());
        assert!(args.resolution.is_none());
        assert!(args.fps.is_none());
        assert!(args.mode.is_none());
        assert!(args.output_dir.is_none());
        assert!(args.format.is_none());
        assert!(args.warmup_frames.is_none());
        assert!(args.max_read_errors.is_none());
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_combined_options() {
        let args = Args::parse_from([
            "webcam-analyzer",
            "--device",
            "1",
            "--backend",
            "v4l2",
            "--resolution",
            "1280x720",
            "--fps",
            "60",
            "--mode",
            "edge",
            "--output-dir",
            "/tmp/shots",
            "--format",
            "png",
            "--warmup-frames",
            "5",
            "--max-read-errors",
            "3",
            "-vv",
        ]);
        assert_eq!(args.device, Some(1));
        assert_eq!(args.backend, Some(Backend::V4l2));
        assert_eq!(args.resolution, Some(Resolution::HIGH));
        assert_eq!(args.fps, Some(60));
        assert_eq!(args.mode, Some(FilterMode::Edge));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/shots")));
        assert_eq!(args.format, Some(ImageFormat::Png));
        assert_eq!(args.warmup_frames, Some(5));
        assert_eq!(args.max_read_errors, Some(3));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_args_mode_aliases() {
        let args = Args::parse_from(["webcam-analyzer", "-m", "grey"]);
        assert_eq!(args.mode, Some(FilterMode::Grayscale));

        let args = Args::parse_from(["webcam-analyzer", "--mode", "mirror-vertical"]);
        assert_eq!(args.mode, Some(FilterMode::MirrorVertical));
    }

    #[test]
    fn test_args_rejects_bad_values() {
        assert!(Args::try_parse_from(["webcam-analyzer", "--mode", "sepia"]).is_err());
        assert!(Args::try_parse_from(["webcam-analyzer", "--fps", "0"]).is_err());
        assert!(Args::try_parse_from(["webcam-analyzer", "--fps", "121"]).is_err());
        assert!(Args::try_parse_from(["webcam-analyzer", "--resolution", "640"]).is_err());
        assert!(Args::try_parse_from(["webcam-analyzer", "--format", "gif"]).is_err());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("320x240"), Ok(Resolution::LOW));
        assert_eq!(
            parse_resolution("7680x4320"),
            Ok(Resolution {
                width: 7680,
                height: 4320
            })
        );
        assert!(parse_resolution("0x480").is_err());
        assert!(parse_resolution("7681x4320").is_err());
        assert!(parse_resolution("axb").is_err());
        assert!(parse_resolution("640x480x3").is_err());
    }

    #[test]
    fn test_parse_framerate() {
        assert_eq!(parse_framerate("1"), Ok(1));
        assert_eq!(parse_framerate("120"), Ok(120));
        assert!(parse_framerate("fast").is_err());
    }

    #[test]
    fn test_args_list_cameras_subcommand() {
        let args = Args::parse_from(["webcam-analyzer", "list-cameras"]);
        assert!(matches!(args.command, Some(Command::ListCameras)));
    }

    #[test]
    fn test_args_config_subcommands() {
        let args = Args::parse_from(["webcam-analyzer", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let args = Args::parse_from(["webcam-analyzer", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn test_verbose_after_subcommand() {
        let args = Args::parse_from(["webcam-analyzer", "list-cameras", "-v"]);
        assert_eq!(args.verbose, 1);
    }
}
