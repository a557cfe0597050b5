//! Contracts for the external collaborators: the pose-tracking engine and
//! the capture device.
//!
//! The pipeline consumes marker detection and pose estimation as a black
//! box behind [`PoseTracker`]; any concrete engine (or a recorded replay, or
//! a test stub) can stand behind it. Likewise frames arrive through
//! [`FrameSource`] regardless of whether a camera or an image directory
//! produces them.

use crate::camera::CameraModel;
use crate::frame::{Frame, FrameView};
use crate::observation::{FrameObservationSet, SelectedMarker};
use crate::pose::{PoseMatrix, ProjectionMatrix};

/// Pixel layout of the frames handed to [`PoseTracker::detect`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelFormat {
    #[default]
    Rgb8,
    Bgr8,
}

/// How the engine undistorts observed image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UndistortionMode {
    None,
    /// Lookup-table undistortion: fast, adequate below high resolutions.
    #[default]
    LookupTable,
    Iterative,
}

/// Which fiducial coding the engine decodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerCoding {
    /// BCH-coded marker ids.
    #[default]
    IdBch,
    Simple,
    Template,
}

/// Pose-solve algorithm the engine runs on the selected marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoseEstimatorKind {
    Standard,
    /// Robust planar pose estimator.
    #[default]
    RobustPlanar,
}

/// Fixed engine configuration, set once at initialization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    pub pixel_format: PixelFormat,
    pub undistortion: UndistortionMode,
    pub marker_coding: MarkerCoding,
    pub pose_estimator: PoseEstimatorKind,
    /// Pattern width in marker-side units; 1.0 means the pose translation is
    /// measured in marker sides.
    pub pattern_width: f32,
    /// Black border width as a fraction of the marker side.
    pub border_width: f32,
    /// Retries for automatic threshold search under varying light.
    pub auto_threshold_retries: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb8,
            undistortion: UndistortionMode::LookupTable,
            marker_coding: MarkerCoding::IdBch,
            pose_estimator: PoseEstimatorKind::RobustPlanar,
            pattern_width: 1.0,
            border_width: 0.125,
            auto_threshold_retries: 3,
        }
    }
}

/// Errors surfaced by tracker implementations.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("tracker is not configured with a camera model")]
    NotConfigured,

    #[error("tracking engine failed: {0}")]
    Engine(String),
}

/// The narrow pose-source contract the frame loop drives every tick.
pub trait PoseTracker {
    /// Accept the session camera model (including its clip planes) and
    /// return the fixed projection matrix for the session.
    fn configure(&mut self, model: &CameraModel) -> Result<ProjectionMatrix, TrackerError>;

    /// Detect markers in one frame. An empty set is a normal result.
    fn detect(&mut self, frame: FrameView<'_>) -> FrameObservationSet;

    /// Designate one observation of the last detection as authoritative,
    /// using the engine's confidence ranking. Ties must break
    /// deterministically (see [`crate::rank_best`]).
    fn select_best(&mut self, set: &FrameObservationSet) -> Option<SelectedMarker>;

    /// The model-view matrix of the selected marker. Valid only after a
    /// successful [`Self::select_best`] following a non-empty detection.
    fn current_pose(&self) -> Option<PoseMatrix>;
}

impl<T: PoseTracker + ?Sized> PoseTracker for Box<T> {
    fn configure(&mut self, model: &CameraModel) -> Result<ProjectionMatrix, TrackerError> {
        (**self).configure(model)
    }

    fn detect(&mut self, frame: FrameView<'_>) -> FrameObservationSet {
        (**self).detect(frame)
    }

    fn select_best(&mut self, set: &FrameObservationSet) -> Option<SelectedMarker> {
        (**self).select_best(set)
    }

    fn current_pose(&self) -> Option<PoseMatrix> {
        (**self).current_pose()
    }
}

/// Engine stand-in that never sees a marker.
///
/// Keeps the pipeline runnable when no concrete tracking engine is
/// attached: the video passes through, the distance stays at its initial
/// default, and the overlay never appears.
pub struct IdleTracker;

impl PoseTracker for IdleTracker {
    fn configure(&mut self, model: &CameraModel) -> Result<ProjectionMatrix, TrackerError> {
        log::warn!("no tracking engine attached; markers will not be detected");
        Ok(crate::pose::projection_from_camera(model))
    }

    fn detect(&mut self, _frame: FrameView<'_>) -> FrameObservationSet {
        FrameObservationSet::default()
    }

    fn select_best(&mut self, _set: &FrameObservationSet) -> Option<SelectedMarker> {
        None
    }

    fn current_pose(&self) -> Option<PoseMatrix> {
        None
    }
}

/// Errors surfaced by frame sources.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to open capture source: {0}")]
    Open(String),

    #[error("failed to acquire frame: {0}")]
    Acquire(String),
}

/// Blocking frame supplier. `next_frame` returns `Ok(None)` when the source
/// is exhausted (end of a replay; a live camera never is).
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}
