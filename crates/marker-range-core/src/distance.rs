//! Marker selection driving and metric distance estimation.

use crate::observation::FrameObservationSet;
use crate::pose::PoseMatrix;
use crate::tracker::PoseTracker;

/// A camera-to-marker distance in real-world length units.
pub type DistanceMeasurement = f64;

/// Default physical marker side length (centimeters).
pub const DEFAULT_MARKER_SIZE: f64 = 8.0;

/// Converts the per-frame observation set and tracker pose into a scalar
/// distance.
///
/// The pose translation is expressed in marker side lengths, so the metric
/// distance is its L2 norm times the configured physical side length.
///
/// Frames with no visible marker keep the previous distance and pose
/// unchanged (sticky last value): a momentary tracking drop must not flicker
/// the measurement back to zero. Absence of markers is a normal state, not
/// an error.
#[derive(Clone, Debug)]
pub struct DistanceEstimator {
    marker_size: f64,
    distance: DistanceMeasurement,
    pose: PoseMatrix,
}

impl DistanceEstimator {
    /// `marker_size` is the physical side length of the (square, planar)
    /// marker; it scales the normalized pose translation.
    pub fn new(marker_size: f64) -> Self {
        Self {
            marker_size,
            distance: 0.0,
            pose: PoseMatrix::zeros(),
        }
    }

    pub fn marker_size(&self) -> f64 {
        self.marker_size
    }

    /// The current (possibly sticky) distance measurement.
    pub fn distance(&self) -> DistanceMeasurement {
        self.distance
    }

    /// The current (possibly sticky) pose.
    pub fn pose(&self) -> &PoseMatrix {
        &self.pose
    }

    /// Run one tick: select the best marker, refresh pose and distance.
    ///
    /// Empty sets leave both untouched and return the retained distance.
    pub fn update<T: PoseTracker + ?Sized>(
        &mut self,
        set: &FrameObservationSet,
        tracker: &mut T,
    ) -> DistanceMeasurement {
        if set.is_empty() {
            return self.distance;
        }
        if tracker.select_best(set).is_some() {
            if let Some(pose) = tracker.current_pose() {
                let t = pose.translation();
                let norm =
                    ((t.x as f64).powi(2) + (t.y as f64).powi(2) + (t.z as f64).powi(2)).sqrt();
                self.pose = pose;
                self.distance = norm * self.marker_size;
            }
        }
        self.distance
    }
}
