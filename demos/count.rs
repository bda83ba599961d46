use std::io::BufRead;

use anyhow::Context;
use vcounter::filter::DetectionFilter;
use vcounter::{CountingService, Detection, Frame, Tracker, TrackerConfig};

/// Replays a detection dump through a counting service.
///
/// Each line is `<frame_height>:<json array of detections>`; an optional
/// second argument points to a JSON tracker config.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args();

    let _ = args.next();
    let in_file_name = args.next().context("expected detections file name")?;
    let config = match args.next() {
        Some(path) => {
            let file = std::fs::File::open(&path).with_context(|| format!("open {}", path))?;
            serde_json::from_reader::<_, TrackerConfig>(file).context("parse tracker config")?
        }
        None => TrackerConfig::default(),
    };

    let dets_file = std::fs::File::open(&in_file_name)?;
    let filter = DetectionFilter::default();
    filter.validate()?;

    let service = CountingService::new(Tracker::new(config)?).with_filter(filter);

    for line in std::io::BufReader::new(dets_file).lines() {
        let line = line?;

        let idx = match line.find(':') {
            Some(idx) => idx,
            None => {
                eprintln!("wrong file format: expected `:`");
                continue;
            }
        };

        let (height, vector) = line.split_at(idx);
        let frame = match (
            height.trim().parse::<f32>(),
            serde_json::from_str::<Vec<Detection>>(&vector[1..]),
        ) {
            (Ok(height), Ok(detections)) => Frame::with_height(height, detections),
            (Ok(_), Err(err)) => {
                eprintln!("wrong file format: parse json failed: {}", err);
                continue;
            }
            (Err(_), _) => {
                eprintln!("wrong file format: parse frame height failed");
                continue;
            }
        };

        let total = service.process_frame(&frame)?;

        for t in service.tracks()? {
            let c = t.center();
            println!("{} {} {} {:?} {}", t.id(), c.x, c.y, t.state(), total);
        }
    }

    println!("{}", serde_json::to_string(&service.summary()?)?);

    Ok(())
}
