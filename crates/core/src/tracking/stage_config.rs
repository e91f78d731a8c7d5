use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    EYE_CENTER_TOLERANCE, EYE_MAX_SKIPPED_FRAMES, EYE_SCALE, EYE_SIDE_TOLERANCE,
    FACE_CENTER_TOLERANCE, FACE_MAX_SKIPPED_FRAMES, FACE_SCALE, FACE_SIDE_TOLERANCE,
    PUPIL_CENTER_TOLERANCE, PUPIL_RADIUS_TOLERANCE, PUPIL_SCALE,
};

/// Per-stage tuning, fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Divisor between absolute frame coordinates and the stage's buffer.
    pub scale: i32,
    /// Consecutive empty detections tolerated before loss of track.
    /// Unused by the pupil stage, which always coasts.
    pub max_skipped_frames: u32,
    pub center_tolerance: i32,
    /// Side (square regions) or radius (circle regions) tolerance.
    pub extent_tolerance: i32,
}

impl StageConfig {
    pub fn face() -> Self {
        Self {
            scale: FACE_SCALE,
            max_skipped_frames: FACE_MAX_SKIPPED_FRAMES,
            center_tolerance: FACE_CENTER_TOLERANCE,
            extent_tolerance: FACE_SIDE_TOLERANCE,
        }
    }

    pub fn eye() -> Self {
        Self {
            scale: EYE_SCALE,
            max_skipped_frames: EYE_MAX_SKIPPED_FRAMES,
            center_tolerance: EYE_CENTER_TOLERANCE,
            extent_tolerance: EYE_SIDE_TOLERANCE,
        }
    }

    pub fn pupil() -> Self {
        Self {
            scale: PUPIL_SCALE,
            max_skipped_frames: 0,
            center_tolerance: PUPIL_CENTER_TOLERANCE,
            extent_tolerance: PUPIL_RADIUS_TOLERANCE,
        }
    }
}
