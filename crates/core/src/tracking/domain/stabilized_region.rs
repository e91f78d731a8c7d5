use std::marker::PhantomData;

use crate::shared::geometry::{Circle, Keypoint, Point, Rectangle, ScreenSize};

/// Shape capability of a [`StabilizedRegion`].
///
/// A shape knows how to read a center and an extent out of its detector
/// evidence, and how to turn a stored `(center, extent)` pair back into a
/// snapshot that lies inside the frame.
pub trait RegionShape {
    type Evidence;
    type Snapshot;

    fn center_of(evidence: &Self::Evidence) -> Point;

    /// Extent as reported by the detector, before any truncation.
    fn extent_of(evidence: &Self::Evidence) -> f32;

    /// Clips a region to `[0, bounds)`. `None` when nothing of it is visible.
    fn clamp(center: Point, extent: i32, bounds: ScreenSize) -> Option<Self::Snapshot>;
}

/// Square region; extent is the side length.
#[derive(Debug)]
pub struct Square;

/// Circular region; extent is the radius.
#[derive(Debug)]
pub struct Round;

/// Bare point; has no extent.
#[derive(Debug)]
pub struct Spot;

impl RegionShape for Square {
    type Evidence = Rectangle;
    type Snapshot = Rectangle;

    fn center_of(evidence: &Rectangle) -> Point {
        evidence.center()
    }

    fn extent_of(evidence: &Rectangle) -> f32 {
        evidence.width as f32
    }

    fn clamp(center: Point, side: i32, bounds: ScreenSize) -> Option<Rectangle> {
        let mut x = center.x - side / 2;
        let mut y = center.y - side / 2;
        let mut width = side;
        let mut height = side;

        if x < 0 {
            width += x;
            x = 0;
        }
        if x + width > bounds.width {
            width = bounds.width - x;
        }
        if y < 0 {
            height += y;
            y = 0;
        }
        if y + height > bounds.height {
            height = bounds.height - y;
        }

        let rect = Rectangle::new(x, y, width, height);
        (!rect.is_empty()).then_some(rect)
    }
}

impl RegionShape for Round {
    type Evidence = Keypoint;
    type Snapshot = Circle;

    fn center_of(evidence: &Keypoint) -> Point {
        Point::new(evidence.x as i32, evidence.y as i32)
    }

    fn extent_of(evidence: &Keypoint) -> f32 {
        evidence.size
    }

    fn clamp(center: Point, radius: i32, bounds: ScreenSize) -> Option<Circle> {
        if bounds.width <= 0 || bounds.height <= 0 {
            return None;
        }
        let x = center.x.clamp(0, bounds.width - 1);
        let y = center.y.clamp(0, bounds.height - 1);
        let radius = radius
            .min(x)
            .min(y)
            .min(bounds.width - 1 - x)
            .min(bounds.height - 1 - y)
            .max(0);
        Some(Circle::new(Point::new(x, y), radius))
    }
}

impl RegionShape for Spot {
    type Evidence = Point;
    type Snapshot = Point;

    fn center_of(evidence: &Point) -> Point {
        *evidence
    }

    fn extent_of(_evidence: &Point) -> f32 {
        0.0
    }

    fn clamp(center: Point, _extent: i32, bounds: ScreenSize) -> Option<Point> {
        if bounds.width <= 0 || bounds.height <= 0 {
            return None;
        }
        Some(Point::new(
            center.x.clamp(0, bounds.width - 1),
            center.y.clamp(0, bounds.height - 1),
        ))
    }
}

/// Tolerance-gated estimate of a tracked entity's position and extent.
///
/// The first piece of evidence is adopted as-is. After that the center snaps
/// to new evidence only when it moves more than `center_tolerance` on either
/// axis, and the extent only when it changes by more than `extent_tolerance`.
/// There is no averaging: the tolerance band is the filter.
#[derive(Debug)]
pub struct StabilizedRegion<S: RegionShape> {
    estimate: Option<(Point, i32)>,
    center_tolerance: i32,
    extent_tolerance: i32,
    bounds: ScreenSize,
    _shape: PhantomData<S>,
}

pub type SquareRegion = StabilizedRegion<Square>;
pub type CircleRegion = StabilizedRegion<Round>;
pub type PointRegion = StabilizedRegion<Spot>;

impl<S: RegionShape> StabilizedRegion<S> {
    pub fn new(bounds: ScreenSize, center_tolerance: i32, extent_tolerance: i32) -> Self {
        Self {
            estimate: None,
            center_tolerance,
            extent_tolerance,
            bounds,
            _shape: PhantomData,
        }
    }

    /// Starts from a known estimate instead of waiting for the first evidence.
    pub fn seeded(
        bounds: ScreenSize,
        center: Point,
        extent: i32,
        center_tolerance: i32,
        extent_tolerance: i32,
    ) -> Self {
        Self {
            estimate: Some((center, extent)),
            ..Self::new(bounds, center_tolerance, extent_tolerance)
        }
    }

    pub fn update(&mut self, evidence: &S::Evidence) {
        let center = S::center_of(evidence);
        let extent = S::extent_of(evidence);

        let Some((current_center, current_extent)) = self.estimate.as_mut() else {
            self.estimate = Some((center, extent as i32));
            return;
        };

        if (center.x - current_center.x).abs() > self.center_tolerance
            || (center.y - current_center.y).abs() > self.center_tolerance
        {
            *current_center = center;
        }
        if (extent - *current_extent as f32).abs() > self.extent_tolerance as f32 {
            *current_extent = extent as i32;
        }
    }

    pub fn get(&self) -> Option<S::Snapshot> {
        self.get_at(Point::ORIGIN)
    }

    /// Current estimate translated by `offset`, clipped to the frame.
    /// Stored state is never modified.
    pub fn get_at(&self, offset: Point) -> Option<S::Snapshot> {
        let (center, extent) = self.estimate?;
        S::clamp(center.translate(offset), extent, self.bounds)
    }

    pub fn center(&self) -> Option<Point> {
        self.estimate.map(|(center, _)| center)
    }

    pub fn extent(&self) -> Option<i32> {
        self.estimate.map(|(_, extent)| extent)
    }
}
