use std::time::Instant;

use serde::Serialize;

use crate::detection::domain::region_detector::{KeypointDetector, RegionDetector};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::geometry::{Circle, Rectangle, ScreenSize};
use crate::tracking::eye_stage::EyeStage;
use crate::tracking::face_stage::FaceStage;
use crate::tracking::pupil_stage::PupilStage;
use crate::tracking::pupil_threshold::PupilThreshold;

use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use super::session_config::SessionConfig;

/// Everything tracked in one frame, in absolute frame coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrackingOutput {
    pub frame_index: usize,
    pub face: Option<Rectangle>,
    pub left_eye: Option<Rectangle>,
    pub right_eye: Option<Rectangle>,
    pub left_pupil: Option<Circle>,
    pub right_pupil: Option<Circle>,
}

impl TrackingOutput {
    pub fn empty(frame_index: usize) -> Self {
        Self {
            frame_index,
            ..Self::default()
        }
    }
}

/// The three detector capabilities a pipeline consumes.
pub struct Detectors {
    pub face: Box<dyn RegionDetector>,
    pub eye: Box<dyn RegionDetector>,
    pub pupil: Box<dyn KeypointDetector>,
}

/// Face, then eyes inside the face, then pupils inside each eye.
///
/// Each stage runs only after its parent's result for the same frame is
/// known; a lost parent short-circuits every stage below it.
pub struct TrackingPipeline {
    face: FaceStage,
    eyes: EyeStage,
    pupils: PupilStage,
    screen: ScreenSize,
}

impl TrackingPipeline {
    pub fn new(
        screen: ScreenSize,
        config: &SessionConfig,
        detectors: Detectors,
        threshold: PupilThreshold,
    ) -> Result<Self, TrackingError> {
        config.validate(screen)?;
        Ok(Self {
            face: FaceStage::new(screen, &config.face, detectors.face),
            eyes: EyeStage::new(screen, &config.eye, detectors.eye),
            pupils: PupilStage::new(
                screen,
                &config.pupil,
                config.pupil_filter.clone(),
                threshold,
                detectors.pupil,
            ),
            screen,
        })
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn pupil_threshold(&self) -> &PupilThreshold {
        self.pupils.threshold()
    }

    pub fn process(&mut self, frame: &Frame) -> Result<TrackingOutput, TrackingError> {
        self.process_with(frame, &mut NullPipelineLogger)
    }

    /// Runs one frame through all stages, reporting per-stage timings and
    /// which entities were tracked.
    pub fn process_with(
        &mut self,
        frame: &Frame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<TrackingOutput, TrackingError> {
        if frame.size() != self.screen {
            return Err(TrackingError::FrameSizeMismatch {
                expected: self.screen,
                actual: frame.size(),
            });
        }

        let start = Instant::now();
        let face = self.face.detect(frame)?;
        logger.timing("face", elapsed_ms(start));

        let start = Instant::now();
        let eyes = self.eyes.detect(frame, face)?;
        logger.timing("eye", elapsed_ms(start));

        let start = Instant::now();
        let pupils = self.pupils.detect(frame, eyes)?;
        logger.timing("pupil", elapsed_ms(start));

        let output = TrackingOutput {
            frame_index: frame.index(),
            face,
            left_eye: eyes.left,
            right_eye: eyes.right,
            left_pupil: pupils.left,
            right_pupil: pupils.right,
        };
        report(&output, logger);
        Ok(output)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn report(output: &TrackingOutput, logger: &mut dyn PipelineLogger) {
    logger.tracked("face", output.face.is_some());
    logger.tracked("left_eye", output.left_eye.is_some());
    logger.tracked("right_eye", output.right_eye.is_some());
    logger.tracked("left_pupil", output.left_pupil.is_some());
    logger.tracked("right_pupil", output.right_pupil.is_some());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::region_detector::DetectionInput;
    use crate::pipeline::pipeline_logger::StdoutPipelineLogger;
    use crate::shared::geometry::{Keypoint, Point};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns the same candidates on every call and counts invocations.
    struct FixedRegions {
        regions: Vec<Rectangle>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedRegions {
        fn new(regions: Vec<Rectangle>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    regions,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl RegionDetector for FixedRegions {
        fn detect(
            &mut self,
            _input: &DetectionInput<'_>,
        ) -> Result<Vec<Rectangle>, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.regions.clone())
        }
    }

    struct FixedKeypoints {
        keypoints: Vec<Keypoint>,
        calls: Arc<AtomicUsize>,
    }

    impl KeypointDetector for FixedKeypoints {
        fn detect(
            &mut self,
            _input: &DetectionInput<'_>,
        ) -> Result<Vec<Keypoint>, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.keypoints.clone())
        }
    }

    const SCREEN: ScreenSize = ScreenSize {
        width: 1280,
        height: 720,
    };

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 1280 * 720], 1280, 720, index)
    }

    struct Calls {
        face: Arc<AtomicUsize>,
        eye: Arc<AtomicUsize>,
        pupil: Arc<AtomicUsize>,
    }

    fn pipeline(
        faces: Vec<Rectangle>,
        eyes: Vec<Rectangle>,
        pupils: Vec<Keypoint>,
    ) -> (TrackingPipeline, Calls) {
        let (face, face_calls) = FixedRegions::new(faces);
        let (eye, eye_calls) = FixedRegions::new(eyes);
        let pupil_calls = Arc::new(AtomicUsize::new(0));
        let pupil = FixedKeypoints {
            keypoints: pupils,
            calls: pupil_calls.clone(),
        };
        let detectors = Detectors {
            face: Box::new(face),
            eye: Box::new(eye),
            pupil: Box::new(pupil),
        };
        let pipeline = TrackingPipeline::new(
            SCREEN,
            &SessionConfig::default(),
            detectors,
            PupilThreshold::default(),
        )
        .unwrap();
        (
            pipeline,
            Calls {
                face: face_calls,
                eye: eye_calls,
                pupil: pupil_calls,
            },
        )
    }

    #[test]
    fn test_full_cascade_in_absolute_coordinates() {
        // face (50,25,40,40) at scale 8 -> (400,200,320,320)
        // eye window (100,50,80,80) at scale 4; left eye (10,20,15,15) -> (440,280,60,60)
        // pupil window of that eye: (220,147,30,22) at scale 2, origin (440,294)
        let (mut pipeline, _) = pipeline(
            vec![Rectangle::new(50, 25, 40, 40)],
            vec![Rectangle::new(10, 20, 15, 15), Rectangle::new(50, 20, 15, 15)],
            vec![Keypoint::new(10.0, 8.0, 3.0)],
        );

        let output = pipeline.process(&frame(7)).unwrap();

        assert_eq!(output.frame_index, 7);
        assert_eq!(output.face, Some(Rectangle::new(400, 200, 320, 320)));
        assert_eq!(output.left_eye, Some(Rectangle::new(440, 280, 60, 60)));
        assert_eq!(output.right_eye, Some(Rectangle::new(600, 280, 60, 60)));
        assert_eq!(
            output.left_pupil,
            Some(Circle::new(Point::new(460, 310), 6))
        );
        assert_eq!(
            output.right_pupil,
            Some(Circle::new(Point::new(620, 310), 6))
        );
    }

    #[test]
    fn test_missing_face_skips_eye_and_pupil_detectors() {
        let (mut pipeline, calls) = pipeline(
            vec![],
            vec![Rectangle::new(10, 20, 15, 15)],
            vec![Keypoint::new(10.0, 8.0, 3.0)],
        );

        // budget of 10 with no prior face: coasting yields nothing
        for i in 0..12 {
            let output = pipeline.process(&frame(i)).unwrap();
            assert_eq!(output, TrackingOutput::empty(i));
        }

        assert_eq!(calls.face.load(Ordering::SeqCst), 12);
        assert_eq!(calls.eye.load(Ordering::SeqCst), 0);
        assert_eq!(calls.pupil.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_eyes_skip_pupil_detector() {
        let (mut pipeline, calls) =
            pipeline(vec![Rectangle::new(50, 25, 40, 40)], vec![], vec![]);

        let output = pipeline.process(&frame(0)).unwrap();

        assert!(output.face.is_some());
        assert!(output.left_eye.is_none() && output.right_eye.is_none());
        assert_eq!(calls.eye.load(Ordering::SeqCst), 1);
        assert_eq!(calls.pupil.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_frame_size_mismatch_is_rejected() {
        let (mut pipeline, calls) = pipeline(vec![], vec![], vec![]);
        let small = Frame::new(vec![0u8; 64 * 48], 64, 48, 0);

        let err = pipeline.process(&small).unwrap_err();

        assert!(matches!(err, TrackingError::FrameSizeMismatch { .. }));
        assert_eq!(calls.face.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let config = SessionConfig {
            pupil_filter: crate::tracking::pupil_filter::PupilFilterConfig {
                median_kernel: 4,
                ..Default::default()
            },
            ..SessionConfig::default()
        };
        let (face, _) = FixedRegions::new(vec![]);
        let (eye, _) = FixedRegions::new(vec![]);
        let detectors = Detectors {
            face: Box::new(face),
            eye: Box::new(eye),
            pupil: Box::new(FixedKeypoints {
                keypoints: vec![],
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        };

        let result = TrackingPipeline::new(SCREEN, &config, detectors, PupilThreshold::default());

        assert!(matches!(result, Err(TrackingError::InvalidConfig(_))));
    }

    #[test]
    fn test_threshold_handle_is_shared_with_pupil_stage() {
        let (pipeline, _) = pipeline(vec![], vec![], vec![]);
        let handle = pipeline.pupil_threshold().clone();
        handle.set(33);
        assert_eq!(pipeline.pupil_threshold().get(), 33);
    }

    #[test]
    fn test_logger_receives_timings_and_tracking_rates() {
        let (mut pipeline, _) = pipeline(vec![Rectangle::new(50, 25, 40, 40)], vec![], vec![]);
        let mut logger = StdoutPipelineLogger::new(10);

        pipeline.process_with(&frame(0), &mut logger).unwrap();
        pipeline.process_with(&frame(1), &mut logger).unwrap();

        assert!(logger.average_ms("face").is_some());
        assert!(logger.average_ms("eye").is_some());
        assert!(logger.average_ms("pupil").is_some());
        assert_eq!(logger.tracking_rate("face"), Some(1.0));
        assert_eq!(logger.tracking_rate("left_pupil"), Some(0.0));
    }
}
