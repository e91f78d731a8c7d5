use crate::detection::domain::region_detector::{DetectionInput, RegionDetector};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::geometry::{Rectangle, ScaledRect, ScreenSize};
use crate::shared::scaled_frame::ScaledFrame;

use super::candidates::{clip_to_window, largest_rect};
use super::domain::skip_budget::SkipBudget;
use super::domain::stabilized_region::SquareRegion;
use super::pair::Pair;
use super::stage_config::StageConfig;

/// Second stage: searches the upper half of the face for both eyes.
///
/// Eye regions are stored relative to the face search window and reported
/// in absolute coordinates. Both sides share one skip budget: it refills
/// only when both eyes were seen and drains only when neither was.
pub struct EyeStage {
    frame: ScaledFrame,
    left: SquareRegion,
    right: SquareRegion,
    budget: SkipBudget,
    detector: Box<dyn RegionDetector>,
}

impl EyeStage {
    pub fn new(screen: ScreenSize, config: &StageConfig, detector: Box<dyn RegionDetector>) -> Self {
        Self {
            frame: ScaledFrame::new(screen, config.scale),
            left: SquareRegion::new(screen, config.center_tolerance, config.extent_tolerance),
            right: SquareRegion::new(screen, config.center_tolerance, config.extent_tolerance),
            budget: SkipBudget::new(config.max_skipped_frames),
            detector,
        }
    }

    /// Without a face there is nothing to search: the detector is not run.
    pub fn detect(
        &mut self,
        frame: &Frame,
        face: Option<Rectangle>,
    ) -> Result<Pair<Rectangle>, TrackingError> {
        let Some(face) = face else {
            return Ok(Pair::none());
        };
        self.frame.refresh(frame)?;

        let scale = self.frame.scale();
        let (window, view) = self.frame.window(face.scale_down(scale));
        let eyes = if window.rect.is_empty() {
            Vec::new()
        } else {
            self.detector
                .detect(&DetectionInput::new(frame.index(), view))
                .map_err(|e| TrackingError::detector("eye", e))?
        };

        let eyes = clip_to_window(
            eyes,
            ScreenSize::new(window.rect.width, window.rect.height),
        );

        let mid_x = window.rect.width / 2;
        let mid_y = window.rect.height / 2;
        let (left_eyes, right_eyes): (Vec<Rectangle>, Vec<Rectangle>) = eyes
            .into_iter()
            .filter(|eye| eye.y < mid_y)
            .partition(|eye| eye.x < mid_x);

        if left_eyes.is_empty() && right_eyes.is_empty() && !self.budget.consume() {
            log::debug!("No eyes detected for {} frames", self.budget.max());
            return Ok(Pair::none());
        }

        let offset = window.absolute_origin();
        match largest_rect(&left_eyes) {
            Some(eye) => {
                self.left.update(&ScaledRect::new(eye, scale).to_absolute());
                log::debug!("Left eye region updated: {:?}", self.left.get_at(offset));
            }
            None => log::debug!("Left eye region reused"),
        }
        match largest_rect(&right_eyes) {
            Some(eye) => {
                self.right.update(&ScaledRect::new(eye, scale).to_absolute());
                log::debug!("Right eye region updated: {:?}", self.right.get_at(offset));
            }
            None => log::debug!("Right eye region reused"),
        }

        if !left_eyes.is_empty() && !right_eyes.is_empty() {
            self.budget.refill();
        }

        Ok(Pair::new(self.left.get_at(offset), self.right.get_at(offset)))
    }
}
