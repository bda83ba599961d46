use vcounter::{CountingMode, Detection, Frame, Tracker, TrackerConfig, Tracking};

fn car(x: f32, y: f32, w: f32, h: f32) -> Detection {
    Detection::new(x, y, w, h, "car", 0.9)
}

fn spawn_tracker(max_missing_frames: u32) -> Tracker {
    let config = TrackerConfig::new(0.05, max_missing_frames).with_mode(CountingMode::SpawnCount);
    Tracker::new(config).unwrap()
}

#[test]
fn first_detection_spawns_counted_track() {
    let mut tracker = spawn_tracker(2);

    tracker.update(&[car(10.0, 10.0, 20.0, 20.0)], None);

    assert_eq!(tracker.active_count(), 1);
    assert_eq!(tracker.total_count(), 1);
}

#[test]
fn overlapping_detection_keeps_identity() {
    let mut tracker = spawn_tracker(2);

    tracker.update(&[car(10.0, 10.0, 20.0, 20.0)], None);
    tracker.update(&[car(12.0, 10.0, 20.0, 20.0)], None);

    let track = &tracker.active_tracks()[0];
    assert_eq!(track.id(), 1);
    assert_eq!(track.age(), 2);
    assert_eq!(track.missing_frames(), 0);
    assert!((track.velocity().x - 1.0).abs() < 1e-6);
    assert!(track.velocity().y.abs() < 1e-6);
}

#[test]
fn track_survives_exactly_max_missing_frames() {
    let mut tracker = spawn_tracker(2);

    tracker.update(&[car(10.0, 10.0, 20.0, 20.0)], None);
    tracker.update(&[car(12.0, 10.0, 20.0, 20.0)], None);

    for missed in 1..=2 {
        tracker.update(&[], None);
        assert_eq!(tracker.active_count(), 1, "dropped after {} misses", missed);
    }

    tracker.update(&[], None);
    assert!(tracker.active_tracks().is_empty());
}

#[test]
fn line_crossing_counts_once() {
    let config = TrackerConfig::new(0.05, 10).with_mode(CountingMode::LineCrossing);
    let mut tracker = Tracker::new(config).unwrap();
    tracker.set_counting_line_y(50.0);

    tracker.update(&[car(0.0, 0.0, 80.0, 80.0)], None);
    assert_eq!(tracker.total_count(), 0);

    tracker.update(&[car(0.0, 20.0, 80.0, 80.0)], None);
    assert_eq!(tracker.total_count(), 1);

    tracker.update(&[car(0.0, 0.0, 80.0, 80.0)], None);
    assert_eq!(tracker.total_count(), 1);
    assert!(tracker.is_counted(1));
}

#[test]
fn counting_line_follows_frame_height() {
    let mut tracker = Tracker::default();

    // line at 100 for a 200px frame
    tracker.process_frame(&Frame::with_height(200.0, vec![car(0.0, 20.0, 80.0, 100.0)]));
    tracker.process_frame(&Frame::with_height(200.0, vec![car(0.0, 60.0, 80.0, 100.0)]));

    assert_eq!(tracker.counting_line_y(), 100.0);
    assert_eq!(tracker.count(), 1);
}

#[test]
fn total_count_never_decreases() {
    let mut tracker = spawn_tracker(1);
    let mut last = 0;

    let frames = vec![
        vec![car(0.0, 0.0, 20.0, 20.0), car(100.0, 0.0, 20.0, 20.0)],
        vec![car(2.0, 0.0, 20.0, 20.0)],
        vec![],
        vec![],
        vec![car(300.0, 300.0, 20.0, 20.0)],
        vec![],
    ];

    for dets in frames {
        tracker.update(&dets, None);
        assert!(tracker.total_count() >= last);
        last = tracker.total_count();
    }

    assert_eq!(last, 3);

    tracker.reset();
    assert_eq!(tracker.total_count(), 0);
}
