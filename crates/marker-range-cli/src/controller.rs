//! The frame loop controller.
//!
//! Drives capture -> detect -> annotate -> select/estimate -> composite ->
//! present, once per frame, on a single thread. All per-session mutable
//! state lives in [`Session`], owned here and handed to collaborators by
//! reference within one iteration.

use log::{debug, info};

use marker_range_core::{
    CameraModel, DistanceEstimator, Frame, FrameSource, PoseTracker, ProjectionMatrix,
    SourceError, TrackerError,
};
use marker_range_render::{title_text, Compositor, KeyInput, Surface, SurfaceError, SurfaceEvent};

use crate::annotate;
use crate::diag;

/// Lifecycle phase of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
    Initializing,
    Running,
    Terminating,
}

/// Fatal pipeline errors. Steady-state non-events (no marker visible) never
/// surface here.
#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Per-session state: the explicit home of what would otherwise be globals.
pub struct Session {
    pub camera: CameraModel,
    pub projection: ProjectionMatrix,
    pub estimator: DistanceEstimator,
    pub ticks: u64,
}

/// Single-threaded controller tying the tracker, frame source, compositor,
/// and surface together.
pub struct FrameLoop<T, S, W> {
    tracker: T,
    source: S,
    surface: W,
    compositor: Compositor,
    session: Session,
    phase: LoopPhase,
}

impl<T, S, W> FrameLoop<T, S, W>
where
    T: PoseTracker,
    S: FrameSource,
    W: Surface,
{
    /// Configure the tracker with the camera model, obtain the session
    /// projection matrix, and set up the compositor. Failures here are
    /// process-fatal by design.
    pub fn initialize(
        camera: CameraModel,
        marker_size: f64,
        mut tracker: T,
        source: S,
        surface: W,
    ) -> Result<Self, LoopError> {
        let phase = LoopPhase::Initializing;
        debug!("frame loop phase: {phase:?}");

        let projection = tracker.configure(&camera)?;
        let compositor = Compositor::new(
            camera.intrinsics.width as usize,
            camera.intrinsics.height as usize,
            projection,
        );
        info!(
            "session configured: {}x{}, marker size {marker_size}",
            camera.intrinsics.width, camera.intrinsics.height
        );

        Ok(Self {
            tracker,
            source,
            surface,
            compositor,
            session: Session {
                camera,
                projection,
                estimator: DistanceEstimator::new(marker_size),
                ticks: 0,
            },
            phase,
        })
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Run until a termination input arrives or the source is exhausted.
    ///
    /// The termination flag is checked only at iteration boundaries: the
    /// iteration that receives the key still completes its render and
    /// present, so the surface is never left partially composited.
    pub fn run(&mut self) -> Result<(), LoopError> {
        self.phase = LoopPhase::Running;
        loop {
            if self.phase == LoopPhase::Terminating {
                break;
            }
            match self.source.next_frame()? {
                Some(frame) => self.tick(frame)?,
                None => {
                    info!("frame source exhausted after {} ticks", self.session.ticks);
                    self.phase = LoopPhase::Terminating;
                }
            }
        }
        Ok(())
    }

    /// One full pipeline iteration over a freshly acquired frame.
    fn tick(&mut self, mut frame: Frame) -> Result<(), LoopError> {
        let observations = self.tracker.detect(frame.view());
        annotate::draw_markers(&mut frame, &observations);

        let distance = self
            .session
            .estimator
            .update(&observations, &mut self.tracker);

        self.compositor
            .compose(&frame.view(), self.session.estimator.pose());
        self.surface.set_title(&title_text(distance));
        self.surface.present(self.compositor.framebuffer())?;
        self.session.ticks += 1;

        for event in self.surface.poll_events() {
            self.handle_event(event);
        }
        Ok(())
    }

    fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Key(KeyInput::Terminate) | SurfaceEvent::CloseRequested => {
                info!("termination requested");
                self.phase = LoopPhase::Terminating;
            }
            SurfaceEvent::Key(KeyInput::DumpCamera) => diag::dump_camera(&self.session.camera),
            SurfaceEvent::Key(KeyInput::DumpProjection) => diag::dump_projection(&self.compositor),
            SurfaceEvent::Key(KeyInput::DumpModelView) => diag::dump_modelview(&self.compositor),
            SurfaceEvent::Resized { width, height } => {
                debug!("viewport resized to {width}x{height}");
                self.compositor.resize(width, height);
            }
        }
    }
}
