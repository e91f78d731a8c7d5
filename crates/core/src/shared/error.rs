use thiserror::Error;

use super::geometry::ScreenSize;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("frame is {}x{}, session expects {}x{}", .actual.width, .actual.height, .expected.width, .expected.height)]
    FrameSizeMismatch {
        expected: ScreenSize,
        actual: ScreenSize,
    },
    #[error("{stage} detector failed: {source}")]
    Detector {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

impl TrackingError {
    pub fn detector(stage: &'static str, source: Box<dyn std::error::Error>) -> Self {
        Self::Detector { stage, source }
    }
}
