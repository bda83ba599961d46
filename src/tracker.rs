use std::collections::HashSet;

use log::{debug, info, warn};

use crate::bbox::{BBox, Ltwh};
use crate::config::{CountingMode, TrackerConfig};
use crate::error::Error;
use crate::{Detection, Frame, Track};

/// Frame-by-frame identity tracker and object counter.
///
/// Association is greedy: tracks are visited in creation order and each one
/// takes the best unclaimed detection above its IoU threshold. There is no
/// global optimisation, so the order of tracks and detections can change the
/// outcome when candidates compete.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    next_id: u32,
    total_count: u32,
    counted: HashSet<u32>,
    counting_line_y: f32,
    counting_line_enabled: bool,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        info!(
            target: "tracker",
            "tracker initialized: mode {:?}, iou {}, missing iou {}, max missing {}",
            config.mode,
            config.iou_threshold,
            config.missing_iou_threshold(),
            config.max_missing_frames
        );

        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::with_capacity(64),
            next_id: 1,
            total_count: 0,
            counted: HashSet::new(),
            counting_line_y: config.counting_line_y,
            counting_line_enabled: true,
            config,
        }
    }

    /// Advances the tracker by one frame.
    ///
    /// `frame_height`, when positive, moves the counting line to
    /// `frame_height * counting_line_ratio`.
    pub fn update(&mut self, detections: &[Detection], frame_height: Option<f32>) {
        if let Some(height) = frame_height.filter(|h| *h > 0.0) {
            self.counting_line_y = height * self.config.counting_line_ratio;
        }

        for track in &mut self.tracks {
            track.increment_missing_frames();
        }

        let line_active = self.line_active();
        let iou_threshold = self.config.iou_threshold;
        let missing_iou_threshold = self.config.missing_iou_threshold();
        let mut matched = vec![false; detections.len()];

        for track in &mut self.tracks {
            let (bbox, threshold) = if track.is_coasting() {
                (track.predicted_bbox(), missing_iou_threshold)
            } else {
                (*track.bbox(), iou_threshold)
            };

            let idx = match best_match(&bbox, threshold, detections, &matched) {
                Some(idx) => idx,
                None => continue,
            };

            let reacquired = track.missing_frames() > 1;
            let old_center_y = track.center().y;

            track.update(&detections[idx]);
            matched[idx] = true;

            if reacquired {
                debug!(target: "tracker", "re-tracked after missing: {}", track);
            }

            if line_active && !self.counted.contains(&track.id()) {
                let new_center_y = track.center().y;

                if crossed_line(old_center_y, new_center_y, self.counting_line_y) {
                    self.counted.insert(track.id());
                    self.total_count += 1;

                    info!(
                        target: "tracker",
                        "track {} ({}) crossed counting line at y={}, total {}",
                        track.id(),
                        track.class(),
                        self.counting_line_y,
                        self.total_count
                    );
                }
            }
        }

        for (det, _) in detections.iter().zip(&matched).filter(|(_, m)| !**m) {
            let track = Track::new(self.next_id, det);
            self.next_id = match self.next_id.checked_add(1) {
                Some(id) => id,
                None => {
                    warn!(target: "tracker", "track ids exhausted, restarting at 1");
                    1
                }
            };

            match self.config.mode {
                CountingMode::SpawnCount => {
                    self.total_count += 1;
                }
                CountingMode::LineCrossing => {
                    // entered below the line: never counted, and never counted later
                    if line_active && det.center_y() > self.counting_line_y {
                        self.counted.insert(track.id());
                        let id = track.id();
                        debug!(target: "tracker", "track {} spawned past counting line", id);
                    }
                }
            }

            info!(target: "tracker", "new track {}", track);
            self.tracks.push(track);
        }

        let max_missing_frames = self.config.max_missing_frames;
        self.tracks.retain(|t| {
            if t.is_lost(max_missing_frames) {
                info!(target: "tracker", "track lost {}", t);
                return false;
            }

            true
        });
    }

    /// Snapshot of the active tracks, in creation order.
    pub fn active_tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Active tracks currently moving faster than the configured speed threshold.
    pub fn moving_count(&self) -> usize {
        let min_speed = self.config.moving_speed_threshold;

        self.tracks.iter().filter(|t| t.is_moving(min_speed)).count()
    }

    #[inline]
    pub fn is_counted(&self, id: u32) -> bool {
        self.counted.contains(&id)
    }

    #[inline]
    pub fn counting_line_y(&self) -> f32 {
        self.counting_line_y
    }

    pub fn set_counting_line_y(&mut self, y: f32) {
        self.counting_line_y = y;
    }

    #[inline]
    pub fn is_counting_line_enabled(&self) -> bool {
        self.counting_line_enabled
    }

    pub fn set_counting_line_enabled(&mut self, enabled: bool) {
        self.counting_line_enabled = enabled;
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Drops every track and count and restarts ids at 1.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.counted.clear();
        self.next_id = 1;
        self.total_count = 0;

        info!(target: "tracker", "tracker reset, all counts cleared");
    }

    #[inline]
    fn line_active(&self) -> bool {
        self.config.mode == CountingMode::LineCrossing && self.counting_line_enabled
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::with_valid_config(TrackerConfig::default())
    }
}

impl crate::Tracking for Tracker {
    #[inline]
    fn process_frame(&mut self, frame: &Frame) {
        self.update(&frame.detections, frame.height);
    }

    #[inline]
    fn snapshot(&self) -> Vec<Track> {
        self.active_tracks()
    }

    #[inline]
    fn active(&self) -> usize {
        self.active_count()
    }

    #[inline]
    fn count(&self) -> u32 {
        self.total_count()
    }

    #[inline]
    fn clear(&mut self) {
        self.reset()
    }
}

/// Index of the unclaimed detection with the highest IoU against `bbox`,
/// provided it reaches `threshold`. Ties keep the earliest detection.
fn best_match(
    bbox: &BBox<Ltwh>,
    threshold: f32,
    detections: &[Detection],
    matched: &[bool],
) -> Option<usize> {
    let mut best_iou = 0.0;
    let mut best_idx = None;

    for (idx, det) in detections.iter().enumerate() {
        if matched[idx] {
            continue;
        }

        let iou = bbox.iou(&det.bbox());
        if iou > best_iou && iou >= threshold {
            best_iou = iou;
            best_idx = Some(idx);
        }
    }

    best_idx
}

/// Downward crossing only: from at or above the line to strictly below it.
#[inline]
fn crossed_line(old_y: f32, new_y: f32, line_y: f32) -> bool {
    old_y <= line_y && line_y < new_y
}
