use clap::Parser;
use std::process::ExitCode;

use webcam_analyzer::camera::{acquire, warm_up, AcquiredCamera, FrameSource, OpenCvOpener};
use webcam_analyzer::cli::{
    apply_overrides, handle_config_action, list_cameras, Args, Command, ConfigAction,
};
use webcam_analyzer::config::{self, Config};
use webcam_analyzer::display::HighGuiWindow;
use webcam_analyzer::error::AppError;
use webcam_analyzer::event_loop::{setup_ctrlc_handler, FrameLoop};
use webcam_analyzer::hotkeys::print_key_help;
use webcam_analyzer::screenshot::ScreenshotWriter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(args: Args) -> Result<ExitCode, AppError> {
    let config_path = args.config.clone().unwrap_or_else(config::default_path);

    // init must work even when the existing file is broken
    if let Some(Command::Config {
        action: ConfigAction::Init,
    }) = &args.command
    {
        handle_config_action(ConfigAction::Init, &Config::default(), &config_path)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load(Some(&config_path))?;
    apply_overrides(&args, &mut config)?;

    match args.command {
        Some(Command::ListCameras) => {
            let mut opener = OpenCvOpener::new(config.camera.backend);
            list_cameras(&mut opener, &config);
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Config { action }) => {
            handle_config_action(action, &config, &config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        None => run_analyzer(&config),
    }
}

fn run_analyzer(config: &Config) -> Result<ExitCode, AppError> {
    let cam = &config.camera;
    let mut opener = OpenCvOpener::new(cam.backend);

    println!("Looking for a camera...");
    let AcquiredCamera {
        index, mut source, ..
    } = acquire(&mut opener, &cam.indices, cam.probe_delay())?;

    source.apply_settings(&cam.settings())?;
    let (resolution, reported_fps) = source.negotiated()?;
    let fps = if reported_fps > 0.0 {
        reported_fps
    } else {
        f64::from(cam.fps)
    };
    println!("Camera {} ready: {} @ {:.1} fps", index, resolution, fps);

    if cam.warmup_frames > 0 {
        println!("Warming up camera ({} frames)...", cam.warmup_frames);
        let report = warm_up(&mut source, cam.warmup_frames, cam.warmup_interval());
        if report.delivered == 0 {
            println!("Warning: the camera delivered no frames during warm-up");
        }
        log::info!(
            "warm-up delivered {}/{} frames",
            report.delivered,
            report.attempted
        );
    }

    println!();
    print_key_help();
    println!();

    let writer = ScreenshotWriter::new(&config.output.screenshot_dir, config.output.format);
    let mut window = HighGuiWindow::open(&config.output.window_title)?;
    let stop = setup_ctrlc_handler()?;

    let summary = FrameLoop::new(&mut source, &mut window, &writer, &stop)
        .with_mode(config.filters.initial_mode)
        .with_filters(config.filters.settings.clone())
        .with_settings(config.capture.loop_settings())
        .with_nominal_fps(fps)
        .run()?;

    // Close the window before releasing the device
    drop(window);
    drop(source);

    println!(
        "Webcam stopped ({} frames, {} screenshots)",
        summary.frames, summary.screenshots
    );

    if summary.reason.is_failure() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
