//! Core types for the marker-range pose/distance pipeline.
//!
//! This crate is intentionally small and purely geometric. It holds the
//! camera model and calibration adapter, video frames and marker
//! observations, the pose-tracker contract, best-marker selection, metric
//! distance estimation, and the fixed-precision matrix dump formatting used
//! by the interactive diagnostics. It does *not* depend on any capture
//! device, tracking engine, or rendering backend.

mod camera;
mod distance;
mod dump;
mod frame;
mod logger;
mod observation;
mod pose;
mod tracker;

pub use camera::{
    build_camera_model, load_calibration, CalibrationError, CalibrationFile, CameraIntrinsics,
    CameraModel, DEFAULT_FAR_PLANE, DEFAULT_NEAR_PLANE,
};
pub use distance::{DistanceEstimator, DistanceMeasurement, DEFAULT_MARKER_SIZE};
pub use dump::{format_camera_matrix, format_matrix4, parse_dump};
pub use frame::{sample_bilinear_rgb, sample_bilinear_rgb_u8, Frame, FrameError, FrameView};
pub use logger::init_with_level;
pub use observation::{rank_best, FrameObservationSet, MarkerObservation, SelectedMarker};
pub use pose::{projection_from_camera, PoseMatrix, ProjectionMatrix};
pub use tracker::{
    FrameSource, IdleTracker, MarkerCoding, PixelFormat, PoseEstimatorKind, PoseTracker,
    SourceError, TrackerConfig, TrackerError, UndistortionMode,
};
