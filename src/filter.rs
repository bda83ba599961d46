use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::Detection;

/// Horizontal band around the counting line.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct CountingZone {
    /// Band center as a fraction of the frame height
    pub ratio: f32,
    /// Half-height of the band, in px
    pub margin: f32,
}

/// Pre-tracking selection of relevant detections.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionFilter {
    /// Accepted class labels, compared case-insensitively. Empty accepts all.
    pub classes: Vec<String>,
    pub min_confidence: f32,
    pub zone: Option<CountingZone>,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            classes: ["car", "motorcycle", "bus", "truck"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            min_confidence: 0.35,
            zone: None,
        }
    }
}

impl DetectionFilter {
    pub fn new(classes: Vec<String>, min_confidence: f32) -> Self {
        Self {
            classes,
            min_confidence,
            zone: None,
        }
    }

    pub fn with_zone(mut self, ratio: f32, margin: f32) -> Self {
        self.zone = Some(CountingZone { ratio, margin });
        self
    }

    pub fn accepts(&self, det: &Detection, frame_height: Option<f32>) -> bool {
        if det.confidence < self.min_confidence {
            return false;
        }

        if !self.accepts_class(&det.class) {
            return false;
        }

        // the zone needs a frame height to be placed
        match (self.zone, frame_height) {
            (Some(zone), Some(height)) => {
                let line_y = height * zone.ratio;
                let cy = det.center_y();

                cy >= line_y - zone.margin && cy <= line_y + zone.margin
            }
            _ => true,
        }
    }

    /// Validates the thresholds, typically after loading the filter from JSON.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::InvalidConfig(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }

        if let Some(zone) = self.zone {
            if !(0.0..=1.0).contains(&zone.ratio) {
                return Err(Error::InvalidConfig(format!(
                    "zone ratio must be within [0, 1], got {}",
                    zone.ratio
                )));
            }

            if !zone.margin.is_finite() || zone.margin < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "zone margin must be non-negative, got {}",
                    zone.margin
                )));
            }
        }

        Ok(())
    }

    pub fn apply(&self, detections: &[Detection], frame_height: Option<f32>) -> Vec<Detection> {
        detections
            .iter()
            .filter(|d| self.accepts(d, frame_height))
            .cloned()
            .collect()
    }

    fn accepts_class(&self, class: &str) -> bool {
        self.classes.is_empty() || self.classes.iter().any(|c| c.eq_ignore_ascii_case(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class: &str, confidence: f32, y: f32) -> Detection {
        Detection::new(0.0, y, 10.0, 10.0, class, confidence)
    }

    #[test]
    fn keeps_vehicle_classes_above_confidence() {
        let filter = DetectionFilter::default();
        let dets = vec![
            det("car", 0.9, 0.0),
            det("person", 0.9, 0.0),
            det("Truck", 0.5, 0.0),
            det("bus", 0.2, 0.0),
        ];

        let kept = filter.apply(&dets, None);
        let classes: Vec<_> = kept.iter().map(|d| d.class.as_str()).collect();
        assert_eq!(classes, vec!["car", "Truck"]);
    }

    #[test]
    fn empty_class_list_accepts_everything() {
        let filter = DetectionFilter::new(vec![], 0.0);
        assert!(filter.accepts(&det("person", 0.01, 0.0), None));
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        assert!(DetectionFilter::default().validate().is_ok());
        assert!(DetectionFilter::default().with_zone(0.6, 50.0).validate().is_ok());

        assert!(DetectionFilter::new(vec![], f32::NAN).validate().is_err());
        assert!(DetectionFilter::new(vec![], 1.5).validate().is_err());
        assert!(DetectionFilter::default().with_zone(0.6, -1.0).validate().is_err());

        let filter = DetectionFilter::default().with_zone(f32::INFINITY, 10.0);
        assert!(matches!(filter.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn loaded_filter_is_checked() {
        let json = r#"{"classes":["car"],"min_confidence":-0.5}"#;
        let filter: DetectionFilter = serde_json::from_str(json).unwrap();

        assert_eq!(filter.zone, None);
        assert!(filter.validate().is_err());
    }

    #[test]
    fn zone_keeps_band_around_line() {
        let filter = DetectionFilter::default().with_zone(0.6, 50.0);

        // line at 600 for a 1000px frame; centers are y + 5
        assert!(filter.accepts(&det("car", 0.9, 595.0), Some(1000.0)));
        assert!(filter.accepts(&det("car", 0.9, 545.0), Some(1000.0)));
        assert!(!filter.accepts(&det("car", 0.9, 500.0), Some(1000.0)));
        assert!(!filter.accepts(&det("car", 0.9, 700.0), Some(1000.0)));

        // no height, no zone
        assert!(filter.accepts(&det("car", 0.9, 0.0), None));
    }
}
