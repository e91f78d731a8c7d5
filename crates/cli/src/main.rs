use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use eyetrack_core::detection::infrastructure::blob_detector::{BlobDetector, BlobDetectorConfig};
use eyetrack_core::detection::infrastructure::replay_detector::{DetectionLog, ReplayDetector};
use eyetrack_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use eyetrack_core::pipeline::session_config::SessionConfig;
use eyetrack_core::pipeline::tracking_pipeline::Detectors;
use eyetrack_core::pipeline::tracking_session::{DetectorFactory, TrackingSession};
use eyetrack_core::video::domain::frame_source::FrameSource;
use eyetrack_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Face, eye and pupil tracking over a directory of video frames.
#[derive(Parser)]
#[command(name = "eyetrack")]
struct Cli {
    /// Directory of frame images, processed in file-name order.
    frames: PathBuf,

    /// Recorded face and eye detections (JSON) to replay.
    #[arg(long)]
    detections: PathBuf,

    /// Session configuration (JSON). Missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pupil binarisation threshold (0-255); overrides the config file.
    #[arg(long)]
    pupil_threshold: Option<u8>,

    /// Smallest dark blob, in pixels, accepted as a pupil candidate.
    #[arg(long, default_value = "4")]
    min_blob_area: usize,

    /// Log progress every N frames.
    #[arg(long, default_value = "30")]
    progress_every: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(threshold) = cli.pupil_threshold {
        config.pupil_threshold = threshold;
    }

    let detections = DetectionLog::load(&cli.detections)?;
    log::info!(
        "Loaded recorded detections for {} frames",
        detections.faces.len()
    );
    let blob_config = BlobDetectorConfig {
        min_area: cli.min_blob_area,
        ..BlobDetectorConfig::default()
    };
    let factory = build_detectors(detections, blob_config);

    let mut reader = ImageSequenceReader::new();
    let metadata = reader.open(&cli.frames)?;

    let mut session = TrackingSession::new(
        config,
        factory,
        Box::new(StdoutPipelineLogger::new(cli.progress_every)),
    );
    session.set_total_frames(metadata.total_frames);
    let screen = metadata.screen();
    session.on_started(screen.width, screen.height)?;

    let mut out = BufWriter::new(io::stdout().lock());
    for frame in reader.frames() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                continue;
            }
        };
        let output = session.on_frame(&frame)?;
        serde_json::to_writer(&mut out, &output)?;
        writeln!(out)?;
    }
    out.flush()?;

    session.on_stopped();
    reader.close();
    Ok(())
}

fn build_detectors(detections: DetectionLog, blob_config: BlobDetectorConfig) -> DetectorFactory {
    Box::new(move || Detectors {
        face: Box::new(ReplayDetector::new(detections.faces.clone())),
        eye: Box::new(ReplayDetector::new(detections.eyes.clone())),
        pupil: Box::new(BlobDetector::new(blob_config.clone())),
    })
}
