use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::geometry::ScreenSize;
use crate::tracking::pupil_threshold::PupilThreshold;

use super::pipeline_logger::PipelineLogger;
use super::session_config::SessionConfig;
use super::tracking_pipeline::{Detectors, TrackingOutput, TrackingPipeline};

/// Builds a fresh set of detectors for each started session.
pub type DetectorFactory = Box<dyn FnMut() -> Detectors + Send>;

/// Drives a [`TrackingPipeline`] from frame-source callbacks.
///
/// The pipeline and its scaled buffers exist only between `on_started` and
/// `on_stopped`. Frames delivered outside that window produce an empty
/// output. The pupil threshold handle outlives individual sessions, so a
/// value set before start applies to the first frame.
pub struct TrackingSession {
    config: SessionConfig,
    make_detectors: DetectorFactory,
    threshold: PupilThreshold,
    pipeline: Option<TrackingPipeline>,
    logger: Box<dyn PipelineLogger>,
    frames: usize,
    total_frames: usize,
}

impl TrackingSession {
    pub fn new(
        config: SessionConfig,
        make_detectors: DetectorFactory,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        let threshold = PupilThreshold::new(config.pupil_threshold);
        Self {
            config,
            make_detectors,
            threshold,
            pipeline: None,
            logger,
            frames: 0,
            total_frames: 0,
        }
    }

    /// Number of frames the source will deliver, when it is known up front.
    /// Progress is then reported as a fraction of it; 0 means a live source.
    pub fn set_total_frames(&mut self, total: usize) {
        self.total_frames = total;
    }

    pub fn pupil_threshold(&self) -> PupilThreshold {
        self.threshold.clone()
    }

    pub fn is_running(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Allocates the pipeline for a stream of `width` x `height` frames.
    ///
    /// A second call restarts tracking from scratch.
    pub fn on_started(&mut self, width: i32, height: i32) -> Result<(), TrackingError> {
        let screen = ScreenSize::new(width, height);
        let pipeline = TrackingPipeline::new(
            screen,
            &self.config,
            (self.make_detectors)(),
            self.threshold.clone(),
        )?;
        if self.pipeline.replace(pipeline).is_some() {
            log::warn!("Tracking session restarted without stop");
        }
        self.frames = 0;
        self.logger
            .info(&format!("Tracking session started at {width}x{height}"));
        Ok(())
    }

    pub fn on_frame(&mut self, frame: &Frame) -> Result<TrackingOutput, TrackingError> {
        let Some(pipeline) = self.pipeline.as_mut() else {
            log::debug!("Frame {} delivered outside a session", frame.index());
            return Ok(TrackingOutput::empty(frame.index()));
        };
        let output = pipeline.process_with(frame, self.logger.as_mut())?;
        self.frames += 1;
        self.logger.progress(self.frames, self.total_frames);
        Ok(output)
    }

    /// Releases the pipeline. Only the first call after a start has any
    /// effect.
    pub fn on_stopped(&mut self) {
        if self.pipeline.take().is_none() {
            return;
        }
        self.logger.info(&format!(
            "Tracking session stopped after {} frames",
            self.frames
        ));
        self.logger.summary();
    }
}
