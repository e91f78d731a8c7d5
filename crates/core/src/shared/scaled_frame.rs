use ndarray::{s, Array2, ArrayView2};

use super::error::TrackingError;
use super::frame::Frame;
use super::geometry::{Rectangle, ScaledRect, ScreenSize};

/// Downscaled grayscale copy of the current video frame.
///
/// The buffer is allocated once for the session and overwritten by every
/// [`ScaledFrame::refresh`]; each output pixel is the mean of the
/// `scale x scale` block it covers.
#[derive(Debug)]
pub struct ScaledFrame {
    pixels: Array2<u8>,
    scale: i32,
    source: ScreenSize,
}

impl ScaledFrame {
    pub fn new(source: ScreenSize, scale: i32) -> Self {
        let scaled = source.scaled_down(scale);
        Self {
            pixels: Array2::zeros((scaled.height.max(0) as usize, scaled.width.max(0) as usize)),
            scale,
            source,
        }
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn size(&self) -> ScreenSize {
        let (rows, cols) = self.pixels.dim();
        ScreenSize::new(cols as i32, rows as i32)
    }

    pub fn refresh(&mut self, frame: &Frame) -> Result<(), TrackingError> {
        if frame.size() != self.source {
            return Err(TrackingError::FrameSizeMismatch {
                expected: self.source,
                actual: frame.size(),
            });
        }

        let src = frame.as_ndarray();
        let scale = self.scale as usize;
        let block = (scale * scale) as u32;
        for ((row, col), out) in self.pixels.indexed_iter_mut() {
            let y0 = row * scale;
            let x0 = col * scale;
            let sum: u32 = src
                .slice(s![y0..y0 + scale, x0..x0 + scale])
                .iter()
                .map(|&v| v as u32)
                .sum();
            *out = ((sum + block / 2) / block) as u8;
        }
        Ok(())
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.pixels.view()
    }

    /// Sub-window of the scaled buffer, clipped to its bounds.
    ///
    /// Returns the clipped rectangle along with the view so callers can map
    /// results back to absolute coordinates.
    pub fn window(&self, roi: ScaledRect) -> (ScaledRect, ArrayView2<'_, u8>) {
        debug_assert_eq!(roi.scale, self.scale, "roi scale must match the frame");
        let clipped = roi.clip_to(self.size());
        let Rectangle {
            x,
            y,
            width,
            height,
        } = clipped.rect;
        let view = self.pixels.slice(s![
            y as usize..(y + height) as usize,
            x as usize..(x + width) as usize
        ]);
        (clipped, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        Frame::new(data, width, height, 0)
    }

    #[test]
    fn test_size_is_source_divided_by_scale() {
        let frame = ScaledFrame::new(ScreenSize::new(1280, 720), 8);
        assert_eq!(frame.size(), ScreenSize::new(160, 90));
        assert_eq!(frame.scale(), 8);
    }

    #[test]
    fn test_refresh_averages_blocks() {
        // 4x2 frame, scale 2 -> 2x1
        let frame = Frame::new(vec![0, 10, 100, 100, 20, 30, 100, 100], 4, 2, 0);
        let mut scaled = ScaledFrame::new(frame.size(), 2);
        scaled.refresh(&frame).unwrap();
        assert_eq!(scaled.view()[[0, 0]], 15);
        assert_eq!(scaled.view()[[0, 1]], 100);
    }

    #[test]
    fn test_refresh_reuses_buffer() {
        let frame = gradient_frame(16, 16);
        let mut scaled = ScaledFrame::new(frame.size(), 4);
        let before = scaled.view().as_ptr();
        scaled.refresh(&frame).unwrap();
        scaled.refresh(&frame).unwrap();
        assert_eq!(scaled.view().as_ptr(), before);
    }

    #[test]
    fn test_refresh_rejects_wrong_size() {
        let mut scaled = ScaledFrame::new(ScreenSize::new(16, 16), 4);
        let err = scaled.refresh(&gradient_frame(8, 8)).unwrap_err();
        assert!(matches!(err, TrackingError::FrameSizeMismatch { .. }));
    }

    #[test]
    fn test_window_is_clipped_to_buffer() {
        let scaled = ScaledFrame::new(ScreenSize::new(40, 40), 4);
        let roi = ScaledRect::new(Rectangle::new(6, 6, 10, 10), 4);
        let (clipped, view) = scaled.window(roi);
        assert_eq!(clipped.rect, Rectangle::new(6, 6, 4, 4));
        assert_eq!(view.dim(), (4, 4));
    }
}
