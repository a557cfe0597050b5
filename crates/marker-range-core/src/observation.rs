//! Per-frame marker observations and best-marker ranking.

use nalgebra::Point2;

/// One detected marker in one frame.
///
/// Produced fresh by the tracker every tick and discarded at end of frame;
/// observations are never persisted across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerObservation {
    pub id: u32,
    pub center: Point2<f32>,
    /// The four corner points in detection order.
    pub corners: [Point2<f32>; 4],
    /// Detection confidence in [0, 1], used for best-marker ranking.
    pub confidence: f32,
}

/// The ordered set of markers detected in one frame. May be empty.
#[derive(Clone, Debug, Default)]
pub struct FrameObservationSet {
    pub observations: Vec<MarkerObservation>,
}

impl FrameObservationSet {
    pub fn new(observations: Vec<MarkerObservation>) -> Self {
        Self { observations }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarkerObservation> {
        self.observations.iter()
    }
}

/// The marker a tracker designated as authoritative for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedMarker {
    pub id: u32,
    pub confidence: f32,
}

/// Reference best-marker ranking: highest confidence wins, equal confidence
/// breaks to the lowest marker id.
///
/// Tracker implementations are free to rank internally, but this is the
/// documented deterministic policy the pipeline's tests hold them to.
pub fn rank_best(set: &FrameObservationSet) -> Option<&MarkerObservation> {
    set.iter().fold(None, |best, obs| match best {
        None => Some(obs),
        Some(b) => {
            if obs.confidence > b.confidence || (obs.confidence == b.confidence && obs.id < b.id) {
                Some(obs)
            } else {
                Some(b)
            }
        }
    })
}
