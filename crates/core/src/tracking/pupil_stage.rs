use ndarray::ArrayViewMut2;

use crate::detection::domain::region_detector::{DetectionInput, KeypointDetector};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::geometry::{Circle, Rectangle, ScreenSize};
use crate::shared::scaled_frame::ScaledFrame;

use super::candidates::{keypoint_in_window, largest_keypoint};
use super::domain::stabilized_region::CircleRegion;
use super::pair::Pair;
use super::pupil_filter::{PupilFilter, PupilFilterConfig};
use super::pupil_threshold::PupilThreshold;
use super::stage_config::StageConfig;

#[derive(Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
}

/// Last stage: locates each pupil as the largest dark blob in the lower
/// three quarters of its eye.
///
/// There is no skip budget here. A pupil that is not found keeps its last
/// position relative to the eye window.
pub struct PupilStage {
    frame: ScaledFrame,
    left: CircleRegion,
    right: CircleRegion,
    threshold: PupilThreshold,
    filter: PupilFilter,
    detector: Box<dyn KeypointDetector>,
    work: Vec<u8>,
}

impl PupilStage {
    pub fn new(
        screen: ScreenSize,
        config: &StageConfig,
        filter: PupilFilterConfig,
        threshold: PupilThreshold,
        detector: Box<dyn KeypointDetector>,
    ) -> Self {
        Self {
            frame: ScaledFrame::new(screen, config.scale),
            left: CircleRegion::new(screen, config.center_tolerance, config.extent_tolerance),
            right: CircleRegion::new(screen, config.center_tolerance, config.extent_tolerance),
            threshold,
            filter: PupilFilter::new(filter),
            detector,
            work: Vec::new(),
        }
    }

    pub fn threshold(&self) -> &PupilThreshold {
        &self.threshold
    }

    pub fn detect(
        &mut self,
        frame: &Frame,
        eyes: Pair<Rectangle>,
    ) -> Result<Pair<Circle>, TrackingError> {
        if eyes.is_empty() {
            return Ok(Pair::none());
        }
        self.frame.refresh(frame)?;
        let threshold = self.threshold.get();

        let left = match eyes.left {
            Some(eye) => self.track(frame.index(), eye, Side::Left, threshold)?,
            None => None,
        };
        let right = match eyes.right {
            Some(eye) => self.track(frame.index(), eye, Side::Right, threshold)?,
            None => None,
        };
        Ok(Pair::new(left, right))
    }

    fn track(
        &mut self,
        frame_index: usize,
        eye: Rectangle,
        side: Side,
        threshold: u8,
    ) -> Result<Option<Circle>, TrackingError> {
        let scale = self.frame.scale();
        let (window, view) = self
            .frame
            .window(eye.scale_down(scale).lower_three_quarters());
        let (rows, cols) = view.dim();

        self.work.clear();
        self.work.extend(view.iter().copied());
        let mut cleaned = ArrayViewMut2::from_shape((rows, cols), &mut self.work[..])
            .expect("work buffer holds exactly one window");
        self.filter.apply(&mut cleaned, threshold);

        let keypoints = if cleaned.is_empty() {
            Vec::new()
        } else {
            self.detector
                .detect(&DetectionInput::new(frame_index, cleaned.view()))
                .map_err(|e| TrackingError::detector("pupil", e))?
        };

        let bounds = ScreenSize::new(window.rect.width, window.rect.height);
        let max_diameter = window.rect.width as f32;
        let pupil = largest_keypoint(
            keypoints
                .iter()
                .filter(|k| keypoint_in_window(k, bounds) && k.diameter() <= max_diameter),
        );

        let region = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        let offset = window.absolute_origin();
        match pupil {
            Some(pupil) => {
                region.update(&pupil.scale_up(scale));
                log::debug!("{side:?} pupil region updated: {:?}", region.get_at(offset));
            }
            None => log::debug!("No {side:?} pupil detected"),
        }
        Ok(region.get_at(offset))
    }
}
