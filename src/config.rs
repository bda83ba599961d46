use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// How new identities turn into the total count.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Every spawned track is counted immediately.
    SpawnCount,
    /// Tracks are counted once, when their center crosses the counting line downwards.
    #[default]
    LineCrossing,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU to match a detection to a freshly observed track
    pub iou_threshold: f32,
    /// Frames a track may stay unmatched before it is dropped
    pub max_missing_frames: u32,
    pub mode: CountingMode,
    /// Initial counting line, used until a frame height is supplied
    pub counting_line_y: f32,
    /// Counting line position as a fraction of the frame height
    pub counting_line_ratio: f32,
    pub missing_iou_multiplier: f32,
    pub missing_iou_cap: f32,
    /// Speed (px/frame) above which a track counts as moving
    pub moving_speed_threshold: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.05,
            max_missing_frames: 10,
            mode: CountingMode::default(),
            counting_line_y: 0.5,
            counting_line_ratio: 0.5,
            missing_iou_multiplier: 2.5,
            missing_iou_cap: 0.3,
            moving_speed_threshold: 1.0,
        }
    }
}

impl TrackerConfig {
    pub fn new(iou_threshold: f32, max_missing_frames: u32) -> Self {
        Self {
            iou_threshold,
            max_missing_frames,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: CountingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Relaxed threshold used for coasting tracks, whose box is only a prediction.
    #[inline]
    pub fn missing_iou_threshold(&self) -> f32 {
        (self.iou_threshold * self.missing_iou_multiplier).min(self.missing_iou_cap)
    }

    pub fn validate(&self) -> Result<(), Error> {
        unit_range("iou_threshold", self.iou_threshold)?;
        unit_range("missing_iou_cap", self.missing_iou_cap)?;
        unit_range("counting_line_ratio", self.counting_line_ratio)?;

        if !self.missing_iou_multiplier.is_finite() || self.missing_iou_multiplier <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "missing_iou_multiplier must be positive, got {}",
                self.missing_iou_multiplier
            )));
        }

        if !self.moving_speed_threshold.is_finite() || self.moving_speed_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "moving_speed_threshold must be non-negative, got {}",
                self.moving_speed_threshold
            )));
        }

        if !self.counting_line_y.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "counting_line_y must be finite, got {}",
                self.counting_line_y
            )));
        }

        Ok(())
    }
}

fn unit_range(name: &str, value: f32) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}
