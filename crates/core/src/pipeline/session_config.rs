use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::constants::DEFAULT_PUPIL_THRESHOLD;
use crate::shared::error::TrackingError;
use crate::shared::geometry::ScreenSize;
use crate::tracking::pupil_filter::PupilFilterConfig;
use crate::tracking::stage_config::StageConfig;

/// Everything a tracking session needs besides its detectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub face: StageConfig,
    pub eye: StageConfig,
    pub pupil: StageConfig,
    /// Initial pupil threshold; adjustable later through
    /// [`crate::tracking::pupil_threshold::PupilThreshold`].
    pub pupil_threshold: u8,
    pub pupil_filter: PupilFilterConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            face: StageConfig::face(),
            eye: StageConfig::eye(),
            pupil: StageConfig::pupil(),
            pupil_threshold: DEFAULT_PUPIL_THRESHOLD,
            pupil_filter: PupilFilterConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, TrackingError> {
        serde_json::from_str(text).map_err(|e| TrackingError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, TrackingError> {
        let text = fs::read_to_string(path).map_err(|e| {
            TrackingError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self, screen: ScreenSize) -> Result<(), TrackingError> {
        if screen.width <= 0 || screen.height <= 0 {
            return Err(TrackingError::InvalidConfig(format!(
                "screen size {}x{} has no area",
                screen.width, screen.height
            )));
        }
        for (name, stage) in [("face", &self.face), ("eye", &self.eye), ("pupil", &self.pupil)] {
            if stage.scale < 1 {
                return Err(TrackingError::InvalidConfig(format!(
                    "{name} scale must be >= 1, got {}",
                    stage.scale
                )));
            }
            if screen.width < stage.scale || screen.height < stage.scale {
                return Err(TrackingError::InvalidConfig(format!(
                    "screen {}x{} is smaller than the {name} scale factor {}",
                    screen.width, screen.height, stage.scale
                )));
            }
            if stage.center_tolerance < 0 || stage.extent_tolerance < 0 {
                return Err(TrackingError::InvalidConfig(format!(
                    "{name} tolerances must not be negative"
                )));
            }
        }
        if self.pupil_filter.median_kernel % 2 == 0 {
            return Err(TrackingError::InvalidConfig(format!(
                "median kernel must be odd, got {}",
                self.pupil_filter.median_kernel
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SCREEN: ScreenSize = ScreenSize {
        width: 1280,
        height: 720,
    };

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.face.scale, 8);
        assert_eq!(config.face.max_skipped_frames, 10);
        assert_eq!(config.eye.scale, 4);
        assert_eq!(config.eye.max_skipped_frames, 5);
        assert_eq!(config.pupil.scale, 2);
        assert_eq!(config.pupil_threshold, 70);
        assert_eq!(config.pupil_filter.erode_iterations, 2);
        assert_eq!(config.pupil_filter.dilate_iterations, 4);
        assert_eq!(config.pupil_filter.median_kernel, 5);
        assert!(config.validate(SCREEN).is_ok());
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = SessionConfig::from_json(r#"{"pupil_threshold": 40}"#).unwrap();
        assert_eq!(config.pupil_threshold, 40);
        assert_eq!(config.face, StageConfig::face());
    }

    #[test]
    fn test_json_stage_override() {
        let config = SessionConfig::from_json(
            r#"{"eye": {"scale": 2, "max_skipped_frames": 3, "center_tolerance": 1, "extent_tolerance": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.eye.scale, 2);
        assert_eq!(config.eye.max_skipped_frames, 3);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = SessionConfig::from_json("{\"face\": 1}").unwrap_err();
        assert!(matches!(err, TrackingError::InvalidConfig(_)));
    }

    #[rstest]
    #[case::zero_area(ScreenSize::new(0, 720))]
    #[case::smaller_than_scale(ScreenSize::new(4, 4))]
    fn test_rejects_bad_screen(#[case] screen: ScreenSize) {
        assert!(SessionConfig::default().validate(screen).is_err());
    }

    #[test]
    fn test_rejects_zero_scale() {
        let mut config = SessionConfig::default();
        config.eye.scale = 0;
        assert!(config.validate(SCREEN).is_err());
    }

    #[test]
    fn test_rejects_even_median_kernel() {
        let mut config = SessionConfig::default();
        config.pupil_filter.median_kernel = 4;
        assert!(config.validate(SCREEN).is_err());
    }
}
