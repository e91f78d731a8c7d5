use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::region_detector::{DetectionInput, RegionDetector};
use crate::shared::geometry::Rectangle;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read detection log {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed detection log: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-frame candidates keyed by frame index.
pub type CandidateCache = Arc<HashMap<usize, Vec<Rectangle>>>;

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    index: usize,
    #[serde(default)]
    faces: Vec<Rectangle>,
    #[serde(default)]
    eyes: Vec<Rectangle>,
}

#[derive(Debug, Deserialize)]
struct RecordedLog {
    frames: Vec<RecordedFrame>,
}

/// Face and eye detector output recorded from an earlier run.
///
/// Face candidates are in face-stage buffer coordinates; eye candidates are
/// relative to the eye-stage search window, exactly as a live detector
/// would have returned them.
#[derive(Debug, Clone, Default)]
pub struct DetectionLog {
    pub faces: CandidateCache,
    pub eyes: CandidateCache,
}

impl DetectionLog {
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        let log: RecordedLog = serde_json::from_str(text)?;
        let mut faces = HashMap::new();
        let mut eyes = HashMap::new();
        for frame in log.frames {
            faces.insert(frame.index, frame.faces);
            eyes.insert(frame.index, frame.eyes);
        }
        Ok(Self {
            faces: Arc::new(faces),
            eyes: Arc::new(eyes),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// Replays recorded candidates by frame index.
///
/// Frames missing from the cache yield no candidates, which the stages
/// treat as an ordinary miss.
pub struct ReplayDetector {
    cache: CandidateCache,
}

impl ReplayDetector {
    pub fn new(cache: CandidateCache) -> Self {
        Self { cache }
    }
}

impl RegionDetector for ReplayDetector {
    fn detect(
        &mut self,
        input: &DetectionInput<'_>,
    ) -> Result<Vec<Rectangle>, Box<dyn std::error::Error>> {
        Ok(self
            .cache
            .get(&input.frame_index)
            .cloned()
            .unwrap_or_default())
    }
}
