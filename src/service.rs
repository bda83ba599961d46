use std::sync::{Mutex, MutexGuard};

use log::{debug, info};
use serde_derive::Serialize;

use crate::error::Error;
use crate::filter::DetectionFilter;
use crate::tracker::Tracker;
use crate::{Frame, Track, Tracking};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub active: usize,
    pub total: u32,
}

struct State<T> {
    tracker: T,
    frames: u64,
}

/// Owns a tracker and serializes every frame submitted to it.
///
/// Frames may come from several threads, but they are applied one at a time
/// under a single lock, in the order the lock is acquired.
pub struct CountingService<T: Tracking = Tracker> {
    state: Mutex<State<T>>,
    filter: Option<DetectionFilter>,
}

impl<T: Tracking> CountingService<T> {
    pub fn new(tracker: T) -> Self {
        Self {
            state: Mutex::new(State { tracker, frames: 0 }),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: DetectionFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Applies one frame and returns the total count after it.
    pub fn process_frame(&self, frame: &Frame) -> Result<u32, Error> {
        let mut state = self.lock()?;
        state.frames += 1;

        match &self.filter {
            Some(filter) => {
                let detections = filter.apply(&frame.detections, frame.height);
                state.tracker.process_frame(&Frame {
                    height: frame.height,
                    detections,
                });
            }
            None => state.tracker.process_frame(frame),
        }

        let total = state.tracker.count();

        debug!(
            target: "service",
            "frame {}: {} detections, {} active, total {}",
            state.frames,
            frame.len(),
            state.tracker.active(),
            total
        );

        Ok(total)
    }

    pub fn tracks(&self) -> Result<Vec<Track>, Error> {
        Ok(self.lock()?.tracker.snapshot())
    }

    pub fn summary(&self) -> Result<Summary, Error> {
        let state = self.lock()?;

        Ok(Summary {
            frames: state.frames,
            active: state.tracker.active(),
            total: state.tracker.count(),
        })
    }

    /// Ends the stream: returns the final count and starts over.
    pub fn finish(&self) -> Result<u32, Error> {
        let mut state = self.lock()?;
        let total = state.tracker.count();

        info!(target: "service", "stream finished after {} frames, total {}", state.frames, total);

        state.tracker.clear();
        state.frames = 0;

        Ok(total)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<T>>, Error> {
        self.state.lock().map_err(|_| Error::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::config::{CountingMode, TrackerConfig};
    use crate::Detection;

    fn spawn_service() -> CountingService {
        let config = TrackerConfig::default().with_mode(CountingMode::SpawnCount);
        CountingService::new(Tracker::new(config).unwrap())
    }

    fn car(x: f32) -> Detection {
        Detection::new(x, 0.0, 20.0, 20.0, "car", 0.9)
    }

    #[test]
    fn returns_running_total() {
        let service = spawn_service();

        assert_eq!(service.process_frame(&Frame::new(vec![car(0.0)])).unwrap(), 1);
        assert_eq!(service.process_frame(&Frame::new(vec![car(2.0), car(100.0)])).unwrap(), 2);

        let summary = service.summary().unwrap();
        assert_eq!(
            summary,
            Summary {
                frames: 2,
                active: 2,
                total: 2,
            }
        );

        let ids: Vec<_> = service.tracks().unwrap().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn filter_drops_irrelevant_detections() {
        let service = spawn_service().with_filter(DetectionFilter::default());
        let person = Detection::new(100.0, 0.0, 20.0, 20.0, "person", 0.9);

        let total = service.process_frame(&Frame::new(vec![car(0.0), person])).unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn finish_returns_total_and_resets() {
        let service = spawn_service();
        service.process_frame(&Frame::new(vec![car(0.0)])).unwrap();

        assert_eq!(service.finish().unwrap(), 1);
        assert_eq!(
            service.summary().unwrap(),
            Summary {
                frames: 0,
                active: 0,
                total: 0,
            }
        );
    }

    #[test]
    fn concurrent_frames_are_serialized() {
        // long enough memory that no track retires during the run
        let config = TrackerConfig::new(0.05, 100).with_mode(CountingMode::SpawnCount);
        let service = Arc::new(CountingService::new(Tracker::new(config).unwrap()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for j in 0..10 {
                        let x = (i * 10 + j) as f32 * 100.0;
                        service.process_frame(&Frame::new(vec![car(x)])).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let summary = service.summary().unwrap();
        assert_eq!(summary.frames, 40);
        assert_eq!(summary.active, 40);
        assert_eq!(summary.total, 40);

        let mut ids: Vec<_> = service.tracks().unwrap().iter().map(|t| t.id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=40).collect::<Vec<_>>());
    }
}
