use std::fmt;

use nalgebra as na;

use crate::bbox::{BBox, Ltwh};
use crate::predictor::Predictor;
use crate::Detection;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackState {
    /// Matched in the current frame, the box is an observation.
    Tracked,
    /// Unmatched for one or more frames, the box is extrapolated.
    Coasting,
}

/// An identity persisting across frames.
///
/// Tracks are owned and advanced by [`crate::tracker::Tracker`]; callers only
/// ever see cloned snapshots.
#[derive(Debug, Clone)]
pub struct Track {
    id: u32,
    bbox: BBox<Ltwh>,
    class: String,
    confidence: f32,
    age: u32,
    missing_frames: u32,
    predictor: Predictor,
}

impl Track {
    pub(crate) fn new(id: u32, det: &Detection) -> Self {
        Self {
            id,
            bbox: det.bbox(),
            class: det.class.clone(),
            confidence: det.confidence,
            age: 1,
            missing_frames: 0,
            predictor: Predictor::new(det.center()),
        }
    }

    pub(crate) fn increment_missing_frames(&mut self) {
        self.missing_frames += 1;
    }

    /// Absorbs a matched detection; the velocity is spread over every frame
    /// elapsed since the previous match.
    pub(crate) fn update(&mut self, det: &Detection) {
        let frames_passed = self.missing_frames + 1;

        self.predictor.update(det.center(), frames_passed);
        self.bbox = det.bbox();
        self.class.clone_from(&det.class);
        self.confidence = det.confidence;
        self.missing_frames = 0;
        self.age += 1;
    }

    /// Box to match against: the observed one while tracked, otherwise the
    /// last observed size moved along the velocity and kept off negative coordinates.
    pub fn predicted_bbox(&self) -> BBox<Ltwh> {
        if self.missing_frames == 0 {
            return self.bbox;
        }

        let center = self.predictor.predict(self.missing_frames);

        BBox::xywh(center.x, center.y, self.bbox.width(), self.bbox.height())
            .as_ltwh()
            .clamp_origin()
    }

    #[inline]
    pub fn is_lost(&self, max_missing_frames: u32) -> bool {
        self.missing_frames > max_missing_frames
    }

    #[inline]
    pub fn is_moving(&self, min_speed: f32) -> bool {
        self.predictor.speed() > min_speed
    }

    #[inline]
    pub fn is_coasting(&self) -> bool {
        self.missing_frames > 0
    }

    pub fn state(&self) -> TrackState {
        if self.is_coasting() {
            TrackState::Coasting
        } else {
            TrackState::Tracked
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn bbox(&self) -> &BBox<Ltwh> {
        &self.bbox
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[inline]
    pub fn missing_frames(&self) -> u32 {
        self.missing_frames
    }

    /// Center of the stored box.
    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }

    #[inline]
    pub fn last_center(&self) -> na::Point2<f32> {
        self.predictor.last_center
    }

    #[inline]
    pub fn velocity(&self) -> na::Vector2<f32> {
        self.predictor.velocity
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vel = self.velocity();

        write!(
            f,
            "Track[id={}, class={}, age={}, missing={}, vel=({:.1},{:.1})]",
            self.id, self.class, self.age, self.missing_frames, vel.x, vel.y
        )
    }
}
