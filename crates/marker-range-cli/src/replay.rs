//! Replay frontend: a recorded tracking session played back over an image
//! directory, presenting into PNG files.
//!
//! The recorded session stands in for the external tracking engine, which
//! keeps the whole pipeline runnable (and testable) without camera hardware
//! or a concrete detector build.

use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use marker_range_core::{
    projection_from_camera, rank_best, CameraModel, Frame, FrameObservationSet, FrameSource,
    FrameView, MarkerObservation, PixelFormat, PoseMatrix, PoseTracker, ProjectionMatrix,
    SelectedMarker, SourceError, TrackerConfig, TrackerError,
};
use marker_range_render::{Framebuffer, Surface, SurfaceError, SurfaceEvent};

/// One marker as recorded on disk: points as plain `[x, y]` arrays.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ReplayObservation {
    pub id: u32,
    pub center: [f32; 2],
    pub corners: [[f32; 2]; 4],
    pub confidence: f32,
}

impl ReplayObservation {
    fn to_observation(self) -> MarkerObservation {
        MarkerObservation {
            id: self.id,
            center: Point2::new(self.center[0], self.center[1]),
            corners: self.corners.map(|c| Point2::new(c[0], c[1])),
            confidence: self.confidence,
        }
    }
}

/// One recorded engine result: the markers seen in the frame and the
/// model-view matrix (row-major) of the best one.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReplayFrame {
    #[serde(default)]
    pub observations: Vec<ReplayObservation>,
    #[serde(default)]
    pub pose: Option<[[f32; 4]; 4]>,
}

/// A recorded tracking session, one entry per frame in playback order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReplaySession {
    pub frames: Vec<ReplayFrame>,
}

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("failed to open replay session `{path}`: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse replay session `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// [`PoseTracker`] implementation backed by a [`ReplaySession`].
pub struct ReplayTracker {
    config: TrackerConfig,
    session: ReplaySession,
    cursor: usize,
    selected_pose: Option<PoseMatrix>,
}

impl ReplayTracker {
    pub fn new(session: ReplaySession, config: TrackerConfig) -> Self {
        Self {
            config,
            session,
            cursor: 0,
            selected_pose: None,
        }
    }

    pub fn from_file(path: &Path, config: TrackerConfig) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let session = serde_json::from_str(&text).map_err(|source| ReplayError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(session, config))
    }
}

impl PoseTracker for ReplayTracker {
    fn configure(&mut self, model: &CameraModel) -> Result<ProjectionMatrix, TrackerError> {
        if self.config.pixel_format != PixelFormat::Rgb8 {
            return Err(TrackerError::Engine(format!(
                "replay sessions are recorded in RGB8, not {:?}",
                self.config.pixel_format
            )));
        }
        Ok(projection_from_camera(model))
    }

    fn detect(&mut self, _frame: FrameView<'_>) -> FrameObservationSet {
        let entry = self.session.frames.get(self.cursor);
        self.cursor += 1;
        entry
            .map(|f| {
                FrameObservationSet::new(
                    f.observations
                        .iter()
                        .map(|o| o.to_observation())
                        .collect(),
                )
            })
            .unwrap_or_default()
    }

    fn select_best(&mut self, set: &FrameObservationSet) -> Option<SelectedMarker> {
        let best = rank_best(set)?;
        // The entry `detect` just served.
        let entry = self.session.frames.get(self.cursor.checked_sub(1)?)?;
        self.selected_pose = entry.pose.map(PoseMatrix::from_rows);
        Some(SelectedMarker {
            id: best.id,
            confidence: best.confidence,
        })
    }

    fn current_pose(&self) -> Option<PoseMatrix> {
        self.selected_pose
    }
}

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frame source reading image files from a directory in name order,
/// scaled to the session capture size.
pub struct DirectorySource {
    paths: Vec<PathBuf>,
    cursor: usize,
    width: u32,
    height: u32,
}

impl DirectorySource {
    pub fn open(dir: &Path, width: u32, height: u32) -> Result<Self, SourceError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| SourceError::Open(format!("{}: {e}", dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(SourceError::Open(format!(
                "no frame images in {}",
                dir.display()
            )));
        }
        debug!("replay source: {} frames in {}", paths.len(), dir.display());

        Ok(Self {
            paths,
            cursor: 0,
            width,
            height,
        })
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;

        let img = image::ImageReader::open(path)
            .map_err(|e| SourceError::Acquire(format!("{}: {e}", path.display())))?
            .decode()
            .map_err(|e| SourceError::Acquire(format!("{}: {e}", path.display())))?
            .to_rgb8();

        let img = if img.dimensions() == (self.width, self.height) {
            img
        } else {
            image::imageops::resize(
                &img,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            )
        };

        let frame = Frame::from_raw(
            self.width as usize,
            self.height as usize,
            img.into_raw(),
        )
        .map_err(|e| SourceError::Acquire(e.to_string()))?;
        Ok(Some(frame))
    }
}

/// Headless presentation target writing composited frames as PNGs.
pub struct PngSink {
    dir: PathBuf,
    index: usize,
    last_title: String,
}

impl PngSink {
    pub fn create(dir: &Path) -> Result<Self, SurfaceError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| SurfaceError::Open(format!("{}: {e}", dir.display())))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            index: 0,
            last_title: String::new(),
        })
    }

    pub fn last_title(&self) -> &str {
        &self.last_title
    }

    pub fn frames_written(&self) -> usize {
        self.index
    }
}

impl Surface for PngSink {
    fn present(&mut self, fb: &Framebuffer) -> Result<(), SurfaceError> {
        let mut rgb = Vec::with_capacity(fb.color.len() * 3);
        for &px in &fb.color {
            rgb.push((px >> 16) as u8);
            rgb.push((px >> 8) as u8);
            rgb.push(px as u8);
        }
        let path = self.dir.join(format!("frame_{:05}.png", self.index));
        let img =
            image::RgbImage::from_raw(fb.width() as u32, fb.height() as u32, rgb).ok_or_else(
                || SurfaceError::Present("framebuffer does not match its dimensions".into()),
            )?;
        img.save(&path)
            .map_err(|e| SurfaceError::Present(format!("{}: {e}", path.display())))?;
        self.index += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.last_title = title.to_string();
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(id: u32, confidence: f32) -> ReplayObservation {
        ReplayObservation {
            id,
            center: [320.0, 240.0],
            corners: [[0.0, 0.0]; 4],
            confidence,
        }
    }

    fn session_json() -> String {
        let session = ReplaySession {
            frames: vec![
                ReplayFrame {
                    observations: vec![observation(2, 0.5), observation(1, 0.5)],
                    pose: Some([
                        [1.0, 0.0, 0.0, 0.0],
                        [0.0, 1.0, 0.0, 0.0],
                        [0.0, 0.0, 1.0, 0.5],
                        [0.0, 0.0, 0.0, 1.0],
                    ]),
                },
                ReplayFrame::default(),
            ],
        };
        serde_json::to_string(&session).expect("serialize session")
    }

    #[test]
    fn replay_serves_frames_in_order() {
        let session: ReplaySession =
            serde_json::from_str(&session_json()).expect("parse session");
        let mut tracker = ReplayTracker::new(session, TrackerConfig::default());

        let frame = Frame::new(4, 4);
        let set = tracker.detect(frame.view());
        assert_eq!(set.len(), 2);

        // Equal confidence: the lowest id must win.
        let selected = tracker.select_best(&set).expect("selection");
        assert_eq!(selected.id, 1);
        let pose = tracker.current_pose().expect("pose");
        assert_eq!(pose.translation().z, 0.5);

        let set = tracker.detect(frame.view());
        assert!(set.is_empty());
        assert!(tracker.select_best(&set).is_none());

        // Past the recording: detection keeps returning empty sets.
        assert!(tracker.detect(frame.view()).is_empty());
    }

    #[test]
    fn replay_rejects_non_rgb_configuration() {
        let mut tracker = ReplayTracker::new(
            ReplaySession::default(),
            TrackerConfig {
                pixel_format: PixelFormat::Bgr8,
                ..TrackerConfig::default()
            },
        );
        let model = marker_range_core::build_camera_model(
            &[[600.0, 0.0, 320.0], [0.0, 600.0, 240.0], [0.0, 0.0, 1.0]],
            &[0.0; 4],
            640,
            480,
        )
        .expect("valid calibration");
        assert!(tracker.configure(&model).is_err());
    }

    #[test]
    fn directory_source_scales_and_orders_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, shade) in [("b.png", 200u8), ("a.png", 10u8)] {
            let img = image::RgbImage::from_pixel(8, 8, image::Rgb([shade, shade, shade]));
            img.save(dir.path().join(name)).expect("write frame");
        }

        let mut source = DirectorySource::open(dir.path(), 16, 16).expect("open");
        // Name order: a.png first.
        let first = source.next_frame().expect("frame").expect("some");
        assert_eq!((first.width, first.height), (16, 16));
        assert_eq!(first.pixel(8, 8), [10, 10, 10]);

        let second = source.next_frame().expect("frame").expect("some");
        assert_eq!(second.pixel(8, 8), [200, 200, 200]);

        assert!(source.next_frame().expect("frame").is_none());
    }

    #[test]
    fn directory_source_fails_on_empty_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            DirectorySource::open(dir.path(), 640, 480),
            Err(SourceError::Open(_))
        ));
    }

    #[test]
    fn png_sink_writes_numbered_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = PngSink::create(dir.path()).expect("create sink");
        let fb = Framebuffer::new(8, 8);

        sink.set_title("Distance:   4.0000");
        sink.present(&fb).expect("present");
        sink.present(&fb).expect("present");

        assert_eq!(sink.frames_written(), 2);
        assert_eq!(sink.last_title(), "Distance:   4.0000");
        assert!(dir.path().join("frame_00000.png").exists());
        assert!(dir.path().join("frame_00001.png").exists());
    }
}
