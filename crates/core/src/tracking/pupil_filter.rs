use ndarray::ArrayViewMut2;
use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    PUPIL_DILATE_ITERATIONS, PUPIL_ERODE_ITERATIONS, PUPIL_MEDIAN_KERNEL,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupilFilterConfig {
    pub erode_iterations: usize,
    pub dilate_iterations: usize,
    /// Side of the square median window. Must be odd.
    pub median_kernel: usize,
}

impl Default for PupilFilterConfig {
    fn default() -> Self {
        Self {
            erode_iterations: PUPIL_ERODE_ITERATIONS,
            dilate_iterations: PUPIL_DILATE_ITERATIONS,
            median_kernel: PUPIL_MEDIAN_KERNEL,
        }
    }
}

/// Binarises an eye window and cleans up speckle before blob detection.
///
/// Threshold, then 3x3 erosion, 3x3 dilation and a median blur, all in
/// place. The scratch buffer is kept between frames.
pub struct PupilFilter {
    config: PupilFilterConfig,
    scratch: Vec<u8>,
    window: Vec<u8>,
}

impl PupilFilter {
    pub fn new(config: PupilFilterConfig) -> Self {
        Self {
            config,
            scratch: Vec::new(),
            window: Vec::new(),
        }
    }

    pub fn apply(&mut self, image: &mut ArrayViewMut2<'_, u8>, threshold: u8) {
        if image.is_empty() {
            return;
        }
        threshold_binary(image, threshold);
        for _ in 0..self.config.erode_iterations {
            self.morph(image, |a, b| a.min(b), u8::MAX);
        }
        for _ in 0..self.config.dilate_iterations {
            self.morph(image, |a, b| a.max(b), u8::MIN);
        }
        if self.config.median_kernel > 1 {
            self.median(image);
        }
    }

    fn snapshot(&mut self, image: &ArrayViewMut2<'_, u8>) {
        self.scratch.clear();
        self.scratch.extend(image.iter().copied());
    }

    /// 3x3 rank filter. Out-of-range neighbours are ignored.
    fn morph(&mut self, image: &mut ArrayViewMut2<'_, u8>, pick: fn(u8, u8) -> u8, identity: u8) {
        self.snapshot(image);
        let (rows, cols) = image.dim();
        for row in 0..rows {
            for col in 0..cols {
                let mut acc = identity;
                for r in row.saturating_sub(1)..=(row + 1).min(rows - 1) {
                    for c in col.saturating_sub(1)..=(col + 1).min(cols - 1) {
                        acc = pick(acc, self.scratch[r * cols + c]);
                    }
                }
                image[[row, col]] = acc;
            }
        }
    }

    /// Median blur with replicated borders.
    fn median(&mut self, image: &mut ArrayViewMut2<'_, u8>) {
        self.snapshot(image);
        let (rows, cols) = image.dim();
        let half = (self.config.median_kernel / 2) as i64;
        for row in 0..rows {
            for col in 0..cols {
                self.window.clear();
                for dr in -half..=half {
                    let r = (row as i64 + dr).clamp(0, rows as i64 - 1) as usize;
                    for dc in -half..=half {
                        let c = (col as i64 + dc).clamp(0, cols as i64 - 1) as usize;
                        self.window.push(self.scratch[r * cols + c]);
                    }
                }
                let mid = self.window.len() / 2;
                let (_, median, _) = self.window.select_nth_unstable(mid);
                image[[row, col]] = *median;
            }
        }
    }
}

impl Default for PupilFilter {
    fn default() -> Self {
        Self::new(PupilFilterConfig::default())
    }
}

/// Pixels strictly above `threshold` become 255, the rest 0.
pub fn threshold_binary(image: &mut ArrayViewMut2<'_, u8>, threshold: u8) {
    image.mapv_inplace(|v| if v > threshold { u8::MAX } else { 0 });
}
