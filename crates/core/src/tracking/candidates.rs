use crate::shared::geometry::{Keypoint, Rectangle, ScreenSize};

/// Clips detector candidates to the `window` they were searched in.
///
/// A detector only sees its window, so anything reaching past it is cut
/// back and anything entirely outside is dropped.
pub fn clip_to_window(candidates: Vec<Rectangle>, window: ScreenSize) -> Vec<Rectangle> {
    candidates
        .into_iter()
        .map(|r| r.clip_to(window))
        .filter(|r| !r.is_empty())
        .collect()
}

/// Whether a keypoint's center lies inside a `window`-sized image.
pub fn keypoint_in_window(keypoint: &Keypoint, window: ScreenSize) -> bool {
    keypoint.x >= 0.0
        && keypoint.y >= 0.0
        && keypoint.x < window.width as f32
        && keypoint.y < window.height as f32
        && keypoint.size >= 0.0
}

/// Largest-area rectangle; the first one seen wins ties.
pub fn largest_rect<'a, I>(candidates: I) -> Option<Rectangle>
where
    I: IntoIterator<Item = &'a Rectangle>,
{
    candidates.into_iter().fold(None, |best, r| match best {
        Some(b) if b.area() >= r.area() => Some(b),
        _ => Some(*r),
    })
}

/// Largest keypoint by size; the first one seen wins ties.
pub fn largest_keypoint<'a, I>(candidates: I) -> Option<Keypoint>
where
    I: IntoIterator<Item = &'a Keypoint>,
{
    candidates.into_iter().fold(None, |best, k| match best {
        Some(b) if b.size >= k.size => Some(b),
        _ => Some(*k),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_rect_empty() {
        assert_eq!(largest_rect(&[]), None);
    }

    #[test]
    fn test_largest_rect_by_area() {
        let rects = [
            Rectangle::new(0, 0, 10, 10),
            Rectangle::new(5, 5, 30, 4),
            Rectangle::new(9, 9, 11, 11),
        ];
        assert_eq!(largest_rect(&rects), Some(Rectangle::new(9, 9, 11, 11)));
    }

    #[test]
    fn test_largest_rect_tie_keeps_first() {
        let rects = [
            Rectangle::new(0, 0, 10, 10),
            Rectangle::new(50, 50, 20, 5),
            Rectangle::new(90, 90, 10, 10),
        ];
        assert_eq!(largest_rect(&rects), Some(Rectangle::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_clip_to_window_cuts_and_drops() {
        let window = ScreenSize::new(80, 60);
        let clipped = clip_to_window(
            vec![
                Rectangle::new(70, 50, 20, 20),
                Rectangle::new(300_000_000, 10, 20, 20),
                Rectangle::new(10, 10, 5, 5),
            ],
            window,
        );
        assert_eq!(
            clipped,
            vec![Rectangle::new(70, 50, 10, 10), Rectangle::new(10, 10, 5, 5)]
        );
    }

    #[test]
    fn test_keypoint_in_window() {
        let window = ScreenSize::new(40, 30);
        assert!(keypoint_in_window(&Keypoint::new(0.0, 29.5, 2.0), window));
        assert!(!keypoint_in_window(&Keypoint::new(40.0, 5.0, 2.0), window));
        assert!(!keypoint_in_window(&Keypoint::new(-0.5, 5.0, 2.0), window));
        assert!(!keypoint_in_window(&Keypoint::new(3.0e9, 5.0, 2.0), window));
        assert!(!keypoint_in_window(&Keypoint::new(f32::NAN, 5.0, 2.0), window));
    }

    #[test]
    fn test_largest_keypoint_tie_keeps_first() {
        let points = [
            Keypoint::new(1.0, 1.0, 2.0),
            Keypoint::new(2.0, 2.0, 3.0),
            Keypoint::new(3.0, 3.0, 3.0),
        ];
        assert_eq!(
            largest_keypoint(&points),
            Some(Keypoint::new(2.0, 2.0, 3.0))
        );
    }
}
