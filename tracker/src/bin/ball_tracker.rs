//! Steer a robot toward a detected ball.
//!
//! Reads per-frame detections from a label directory or from JSON lines on
//! stdin, runs the deadzone steering controller, and, with `--conn`, writes one
//! command packet per frame to the robot's serial port. Ctrl-C stops at the
//! next frame and closes the port.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use robot_link::{CancelToken, CommandTransport, SerialPortChannel};
use steering::{SelectionPolicy, SteeringController};
use tracing::{error, info};
use tracker::{
    shutdown, DetectionSource, FrameLoop, JsonLinesSource, LabelDirSource, LoopError, RunConfig,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Steer a robot toward detected targets over a serial link"
)]
struct Args {
    /// JSON run configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of YOLO label files, or '-' for JSON lines on stdin
    #[arg(short, long, default_value = "-")]
    source: String,

    /// Send commands to the robot
    #[arg(long)]
    conn: bool,

    /// Serial device path
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Robot id written into each packet
    #[arg(long)]
    robot_id: Option<u8>,

    /// Detection selection rule: last, first or confidence
    #[arg(long)]
    selection: Option<SelectionPolicy>,

    /// Only steer toward these class ids
    #[arg(long, num_args = 1..)]
    classes: Vec<u32>,

    /// Frames to hold after losing a centered target before searching
    #[arg(long)]
    hold_frames: Option<u32>,

    /// Warn when a frame takes longer than this many milliseconds
    #[arg(long)]
    frame_budget_ms: Option<u64>,
}

fn build_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RunConfig::default(),
    };

    if args.conn {
        config.conn = true;
    }
    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(robot_id) = args.robot_id {
        config.robot_id = robot_id;
    }
    if let Some(selection) = args.selection {
        config.steering.selection = selection;
    }
    if !args.classes.is_empty() {
        config.steering.target_classes = Some(args.classes.clone());
    }
    if let Some(hold_frames) = args.hold_frames {
        config.steering.hold_frames = hold_frames;
    }
    if let Some(budget) = args.frame_budget_ms {
        config.frame_budget_ms = Some(budget);
    }

    config.validate()?;
    Ok(config)
}

fn open_source(location: &str, cancel: &CancelToken) -> Result<Box<dyn DetectionSource>> {
    if location == "-" {
        info!("Reading detections from stdin");
        let source = JsonLinesSource::new(std::io::stdin().lock()).with_cancel(cancel.clone());
        return Ok(Box::new(source));
    }

    let dir = PathBuf::from(location);
    let source = LabelDirSource::open(&dir)
        .with_context(|| format!("Failed to open label directory {}", dir.display()))?;
    info!("Reading {} frames from {}", source.remaining(), dir.display());
    Ok(Box::new(source))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let cancel = CancelToken::new();
    shutdown::install_sigint_handler(cancel.clone())
        .context("Failed to install SIGINT handler")?;

    let controller = SteeringController::new(config.steering.clone())?;
    let mut source = open_source(&args.source, &cancel)?;

    let transport = if config.conn {
        let channel = SerialPortChannel::open(&config.serial)
            .with_context(|| format!("Failed to open serial port {}", config.serial.port))?;
        Some(CommandTransport::new(channel, config.robot_id, cancel.clone()))
    } else {
        info!("No connection requested; commands will not be sent");
        None
    };

    let mut frame_loop = FrameLoop::new(controller, transport, cancel);
    if let Some(ms) = config.frame_budget_ms {
        frame_loop = frame_loop.with_frame_budget(Duration::from_millis(ms));
    }

    info!("Entering tracking loop - press Ctrl+C to exit");
    match frame_loop.run(source.as_mut()) {
        Ok(summary) => {
            info!(
                "Final heading {:.4} rad, speed {:.2}",
                summary.final_state.heading_angle, summary.final_state.forward_speed
            );
            Ok(())
        }
        Err(LoopError::Cancelled) => {
            info!("Interrupted, serial port closed");
            Ok(())
        }
        Err(e) => {
            error!("Tracking loop failed: {e}");
            Err(e.into())
        }
    }
}
