use crate::detection::Detection;

/// Detections observed in one video frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub height: Option<f32>, // in px, moves the counting line when present
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            height: None,
            detections,
        }
    }

    pub fn with_height(height: f32, detections: Vec<Detection>) -> Self {
        Self {
            height: Some(height),
            detections,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
