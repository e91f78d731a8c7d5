use ndarray::ArrayView2;

use crate::shared::geometry::{Keypoint, Rectangle};

/// Grayscale search window handed to a detector, tagged with the frame it
/// was cut from.
#[derive(Clone, Copy, Debug)]
pub struct DetectionInput<'a> {
    pub frame_index: usize,
    pub image: ArrayView2<'a, u8>,
}

impl<'a> DetectionInput<'a> {
    pub fn new(frame_index: usize, image: ArrayView2<'a, u8>) -> Self {
        Self { frame_index, image }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

/// Domain interface for rectangle detectors (face, eye).
///
/// Candidates are returned in the coordinates of `input.image`, in no
/// particular order. Implementations may be stateful, hence `&mut self`.
pub trait RegionDetector: Send {
    fn detect(
        &mut self,
        input: &DetectionInput<'_>,
    ) -> Result<Vec<Rectangle>, Box<dyn std::error::Error>>;
}

/// Domain interface for blob-style keypoint detectors (pupil).
pub trait KeypointDetector: Send {
    fn detect(
        &mut self,
        input: &DetectionInput<'_>,
    ) -> Result<Vec<Keypoint>, Box<dyn std::error::Error>>;
}
