use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameSource, SourceMetadata};

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("failed to list frames in {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no image frames found in {0}")]
    Empty(PathBuf),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} is {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("image sequence reader is not open")]
    NotOpen,
}

/// Treats a directory of image files as a video, one file per frame.
///
/// Files are ordered by name, so zero-padded numbering keeps capture order.
/// Each image is decoded lazily and converted to luma by the `image` crate.
pub struct ImageSequenceReader {
    paths: Vec<PathBuf>,
    metadata: Option<SourceMetadata>,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            metadata: None,
        }
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, VideoError> {
    let list_err = |source| VideoError::List {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn decode(path: &Path) -> Result<image::GrayImage, VideoError> {
    image::open(path)
        .map(|img| img.to_luma8())
        .map_err(|source| VideoError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

fn read_frame(path: &Path, index: usize, meta: &SourceMetadata) -> Result<Frame, VideoError> {
    let gray = decode(path)?;
    if gray.width() != meta.width || gray.height() != meta.height {
        return Err(VideoError::SizeMismatch {
            path: path.to_path_buf(),
            width: meta.width,
            height: meta.height,
            actual_width: gray.width(),
            actual_height: gray.height(),
        });
    }
    Ok(Frame::new(gray.into_raw(), meta.width, meta.height, index))
}

impl FrameSource for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<SourceMetadata, Box<dyn std::error::Error>> {
        let paths = list_images(path)?;
        let first = paths
            .first()
            .ok_or_else(|| VideoError::Empty(path.to_path_buf()))?;
        let (width, height) = image::image_dimensions(first).map_err(|source| VideoError::Decode {
            path: first.clone(),
            source,
        })?;

        let metadata = SourceMetadata {
            width,
            height,
            total_frames: paths.len(),
            source_path: Some(path.to_path_buf()),
        };
        log::info!(
            "Opened {} frames of {width}x{height} from {}",
            paths.len(),
            path.display()
        );
        self.paths = paths;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(meta) = self.metadata.as_ref() else {
            return Box::new(std::iter::once(Err(VideoError::NotOpen.into())));
        };
        Box::new(self.paths.iter().enumerate().map(
            move |(index, path)| -> Result<Frame, Box<dyn std::error::Error>> {
                Ok(read_frame(path, index, meta)?)
            },
        ))
    }

    fn close(&mut self) {
        self.paths.clear();
        self.metadata = None;
    }
}
