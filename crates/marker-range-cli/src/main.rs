//! marker-range: marker pose, metric distance, and AR overlay from a
//! calibrated camera.
//!
//! Replay mode (`--replay <DIR>`) runs the full pipeline headless over an
//! image directory with a recorded tracking session; live mode (`--camera`,
//! feature `live`) captures from the default system camera and presents in
//! a window.

mod annotate;
mod controller;
mod diag;
#[cfg(feature = "live")]
mod live;
mod replay;

use std::path::PathBuf;

use clap::Parser;
use log::info;

use marker_range_core::{
    init_with_level, load_calibration, CalibrationError, CameraModel, TrackerConfig,
    DEFAULT_MARKER_SIZE,
};

use controller::{FrameLoop, LoopError};
use replay::{DirectorySource, PngSink, ReplayError, ReplayTracker};

#[derive(Parser, Debug)]
#[command(
    name = "marker-range",
    about = "Estimate marker pose and metric distance from a calibrated camera, with an AR overlay"
)]
struct Args {
    /// Camera calibration file (JSON with `calib` and `dist`).
    #[arg(long, default_value = "calibration.json")]
    calibration: PathBuf,

    /// Replay a directory of frame images headless.
    #[arg(long, value_name = "DIR", conflicts_with = "camera")]
    replay: Option<PathBuf>,

    /// Capture from the default system camera (requires the `live` feature).
    #[arg(long)]
    camera: bool,

    /// Recorded tracking session (default in replay mode: <DIR>/session.json).
    #[arg(long, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Physical marker side length; scales the measured distance.
    #[arg(long, default_value_t = DEFAULT_MARKER_SIZE)]
    marker_size: f64,

    /// Requested capture width.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Requested capture height.
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Where replay mode writes composited frames (default: <DIR>/composited).
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Verbose logging (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Pipeline(#[from] LoopError),

    #[error("no frame source: pass --replay <DIR> or --camera")]
    NoSource,

    #[cfg(not(feature = "live"))]
    #[error("this build has no live capture; rebuild with `--features live` or use --replay")]
    LiveDisabled,
}

fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = init_with_level(level);

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let calibration = load_calibration(&args.calibration)?;
    let camera_model = calibration.build_model(args.width, args.height)?;
    info!(
        "camera model: fx={:.4} fy={:.4} cx={:.4} cy={:.4}",
        camera_model.intrinsics.fx,
        camera_model.intrinsics.fy,
        camera_model.intrinsics.cx,
        camera_model.intrinsics.cy
    );

    if args.camera {
        return run_live(args, camera_model);
    }
    run_replay(args, camera_model)
}

fn run_replay(args: Args, camera_model: CameraModel) -> Result<(), CliError> {
    let Some(replay_dir) = args.replay else {
        return Err(CliError::NoSource);
    };
    let session_path = args
        .session
        .unwrap_or_else(|| replay_dir.join("session.json"));
    let output = args
        .output
        .unwrap_or_else(|| replay_dir.join("composited"));

    let tracker = ReplayTracker::from_file(&session_path, TrackerConfig::default())?;
    let source =
        DirectorySource::open(&replay_dir, args.width, args.height).map_err(LoopError::from)?;
    let sink = PngSink::create(&output).map_err(LoopError::from)?;

    let mut pipeline =
        FrameLoop::initialize(camera_model, args.marker_size, tracker, source, sink)?;
    pipeline.run()?;

    let session = pipeline.session();
    info!(
        "replayed {} frames into {}",
        session.ticks,
        output.display()
    );
    println!("final distance: {:.4}", session.estimator.distance());
    Ok(())
}

#[cfg(feature = "live")]
fn run_live(args: Args, camera_model: CameraModel) -> Result<(), CliError> {
    use marker_range_core::{IdleTracker, PoseTracker};

    let tracker: Box<dyn PoseTracker> = match &args.session {
        Some(path) => Box::new(ReplayTracker::from_file(path, TrackerConfig::default())?),
        None => Box::new(IdleTracker),
    };
    let source =
        live::CameraSource::open(args.width, args.height).map_err(LoopError::from)?;
    let window = live::LiveWindow::open(
        "marker-range",
        args.width as usize,
        args.height as usize,
    )
    .map_err(LoopError::from)?;

    let mut pipeline =
        FrameLoop::initialize(camera_model, args.marker_size, tracker, source, window)?;
    pipeline.run()?;
    info!("stopped after {} frames", pipeline.session().ticks);
    Ok(())
}

#[cfg(not(feature = "live"))]
fn run_live(_args: Args, _camera_model: CameraModel) -> Result<(), CliError> {
    Err(CliError::LiveDisabled)
}
