use nalgebra as na;

/// Constant-velocity motion model.
///
/// Velocity is the raw per-frame displacement between the two most recent
/// observations; there is no smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Predictor {
    pub last_center: na::Point2<f32>,
    pub velocity: na::Vector2<f32>,
}

impl Predictor {
    pub fn new(center: na::Point2<f32>) -> Self {
        Self {
            last_center: center,
            velocity: na::Vector2::zeros(),
        }
    }

    /// Records a new observation `frames_passed` frames after the previous one.
    pub fn update(&mut self, center: na::Point2<f32>, frames_passed: u32) {
        let frames = frames_passed.max(1) as f32;

        self.velocity = (center - self.last_center) / frames;
        self.last_center = center;
    }

    #[inline]
    pub fn predict(&self, frames: u32) -> na::Point2<f32> {
        self.last_center + self.velocity * frames as f32
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
}
