use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};

/// One object instance observed in a single frame.
///
/// Contains (x,y) of the left top corner and (width,height) of bbox, all in
/// the coordinate space shared by every frame of a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: String,
}

impl Detection {
    pub fn new(x: f32, y: f32, w: f32, h: f32, class: impl Into<String>, confidence: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            confidence,
            class: class.into(),
        }
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltwh> {
        BBox::ltwh(self.x, self.y, self.w, self.h)
    }

    #[inline(always)]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.
    }

    #[inline(always)]
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(self.center_x(), self.center_y())
    }
}
