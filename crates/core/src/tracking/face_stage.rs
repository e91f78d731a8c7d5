use crate::detection::domain::region_detector::{DetectionInput, RegionDetector};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::shared::geometry::{Rectangle, ScaledRect, ScreenSize};
use crate::shared::scaled_frame::ScaledFrame;

use super::candidates::{clip_to_window, largest_rect};
use super::domain::skip_budget::SkipBudget;
use super::domain::stabilized_region::SquareRegion;
use super::stage_config::StageConfig;

/// First stage of the cascade: finds the face on a heavily downscaled frame.
pub struct FaceStage {
    frame: ScaledFrame,
    region: SquareRegion,
    budget: SkipBudget,
    detector: Box<dyn RegionDetector>,
}

impl FaceStage {
    pub fn new(screen: ScreenSize, config: &StageConfig, detector: Box<dyn RegionDetector>) -> Self {
        Self {
            frame: ScaledFrame::new(screen, config.scale),
            region: SquareRegion::new(screen, config.center_tolerance, config.extent_tolerance),
            budget: SkipBudget::new(config.max_skipped_frames),
            detector,
        }
    }

    /// Returns the stabilized face in absolute coordinates.
    ///
    /// On an empty detection the previous region is returned until the skip
    /// budget runs out, then `None`.
    pub fn detect(&mut self, frame: &Frame) -> Result<Option<Rectangle>, TrackingError> {
        self.frame.refresh(frame)?;

        let input = DetectionInput::new(frame.index(), self.frame.view());
        let faces = self
            .detector
            .detect(&input)
            .map_err(|e| TrackingError::detector("face", e))?;
        let faces = clip_to_window(faces, self.frame.size());

        let Some(biggest) = largest_rect(&faces) else {
            if !self.budget.consume() {
                log::debug!("No face detected for {} frames", self.budget.max());
                return Ok(None);
            }
            let reused = self.region.get();
            log::debug!("Face region reused: {reused:?}");
            return Ok(reused);
        };

        self.budget.refill();
        self.region
            .update(&ScaledRect::new(biggest, self.frame.scale()).to_absolute());

        let updated = self.region.get();
        log::debug!("Face region updated: {updated:?}");
        Ok(updated)
    }
}
