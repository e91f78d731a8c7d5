use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::geometry::ScreenSize;

/// Stream properties announced once when a source is opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}

impl SourceMetadata {
    pub fn screen(&self) -> ScreenSize {
        ScreenSize::new(self.width as i32, self.height as i32)
    }
}

/// Delivers grayscale frames in capture order.
///
/// Implementations own decoding and color conversion; the tracking pipeline
/// only sees luma [`Frame`]s of the announced size.
pub trait FrameSource: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<SourceMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames. A failing frame does not end the
    /// iteration.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
