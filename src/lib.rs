pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod filter;
pub mod frame;
pub mod service;
pub mod tracker;

mod predictor;
mod track;

pub use config::{CountingMode, TrackerConfig};
pub use detection::Detection;
pub use error::Error;
pub use frame::Frame;
pub use service::CountingService;
pub use track::{Track, TrackState};
pub use tracker::Tracker;

/// Frame-level interface of a tracker, as driven by [`CountingService`].
pub trait Tracking {
    fn process_frame(&mut self, frame: &Frame);
    fn snapshot(&self) -> Vec<Track>;
    fn active(&self) -> usize;
    fn count(&self) -> u32;
    fn clear(&mut self);
}
