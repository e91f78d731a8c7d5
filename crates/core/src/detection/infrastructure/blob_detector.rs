use serde::{Deserialize, Serialize};

use crate::detection::domain::region_detector::{DetectionInput, KeypointDetector};
use crate::shared::geometry::Keypoint;

/// Pixel value treated as blob interior in the binarised eye window.
const BLOB_VALUE: u8 = 0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobDetectorConfig {
    /// Components smaller than this many pixels are speckle.
    pub min_area: usize,
    pub max_area: usize,
}

impl Default for BlobDetectorConfig {
    fn default() -> Self {
        Self {
            min_area: 4,
            max_area: 5000,
        }
    }
}

/// Finds dark connected components (8-connectivity) in a binary image.
///
/// Each accepted component becomes a keypoint at its centroid whose size is
/// the radius of a disc with the same area.
pub struct BlobDetector {
    config: BlobDetectorConfig,
    visited: Vec<bool>,
    stack: Vec<(usize, usize)>,
}

impl BlobDetector {
    pub fn new(config: BlobDetectorConfig) -> Self {
        Self {
            config,
            visited: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn flood(
        &mut self,
        image: &ndarray::ArrayView2<'_, u8>,
        start: (usize, usize),
    ) -> (usize, f64, f64) {
        let (rows, cols) = image.dim();
        let mut area = 0usize;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;

        self.visited[start.0 * cols + start.1] = true;
        self.stack.push(start);
        while let Some((row, col)) = self.stack.pop() {
            area += 1;
            sum_x += col as f64;
            sum_y += row as f64;

            for dr in -1i64..=1 {
                for dc in -1i64..=1 {
                    let r = row as i64 + dr;
                    let c = col as i64 + dc;
                    if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
                        continue;
                    }
                    let (r, c) = (r as usize, c as usize);
                    let idx = r * cols + c;
                    if !self.visited[idx] && image[[r, c]] == BLOB_VALUE {
                        self.visited[idx] = true;
                        self.stack.push((r, c));
                    }
                }
            }
        }
        (area, sum_x, sum_y)
    }
}

impl Default for BlobDetector {
    fn default() -> Self {
        Self::new(BlobDetectorConfig::default())
    }
}

impl KeypointDetector for BlobDetector {
    fn detect(
        &mut self,
        input: &DetectionInput<'_>,
    ) -> Result<Vec<Keypoint>, Box<dyn std::error::Error>> {
        let image = input.image;
        let (rows, cols) = image.dim();
        self.visited.clear();
        self.visited.resize(rows * cols, false);

        let mut keypoints = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                if self.visited[row * cols + col] || image[[row, col]] != BLOB_VALUE {
                    continue;
                }
                let (area, sum_x, sum_y) = self.flood(&image, (row, col));
                if area < self.config.min_area || area > self.config.max_area {
                    continue;
                }
                let n = area as f64;
                let radius = (n / std::f64::consts::PI).sqrt();
                keypoints.push(Keypoint::new(
                    (sum_x / n) as f32,
                    (sum_y / n) as f32,
                    radius as f32,
                ));
            }
        }
        Ok(keypoints)
    }
}
