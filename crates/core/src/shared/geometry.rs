use serde::{Deserialize, Serialize};

/// Pixel dimensions of the video stream, announced once per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Dimensions of a buffer downscaled by an integer divisor.
    pub fn scaled_down(&self, scale: i32) -> ScreenSize {
        ScreenSize::new(self.width / scale, self.height / scale)
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn translate(self, offset: Point) -> Point {
        Point::new(self.x + offset.x, self.y + offset.y)
    }
}

/// Axis-aligned rectangle, used both for detector candidates and for region
/// snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn translate(self, offset: Point) -> Rectangle {
        Rectangle::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Multiplies every coordinate by `scale`.
    pub fn scale_up(self, scale: i32) -> Rectangle {
        Rectangle::new(
            self.x * scale,
            self.y * scale,
            self.width * scale,
            self.height * scale,
        )
    }

    /// Converts an absolute rectangle into the coordinate system of a buffer
    /// downscaled by `scale`. Coordinates truncate toward zero.
    pub fn scale_down(self, scale: i32) -> ScaledRect {
        ScaledRect {
            rect: Rectangle::new(
                self.x / scale,
                self.y / scale,
                self.width / scale,
                self.height / scale,
            ),
            scale,
        }
    }

    /// Largest rectangle contained in both `self` and `[0, bounds)`.
    pub fn clip_to(self, bounds: ScreenSize) -> Rectangle {
        let x1 = self.x.clamp(0, bounds.width.max(0));
        let y1 = self.y.clamp(0, bounds.height.max(0));
        let x2 = self.x.saturating_add(self.width).min(bounds.width);
        let y2 = self.y.saturating_add(self.height).min(bounds.height);
        Rectangle::new(
            x1,
            y1,
            x2.saturating_sub(x1).max(0),
            y2.saturating_sub(y1).max(0),
        )
    }
}

/// A rectangle expressed in the coordinates of a downscaled buffer.
///
/// Carries its scale factor so it can only return to absolute coordinates
/// through [`ScaledRect::to_absolute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaledRect {
    pub rect: Rectangle,
    pub scale: i32,
}

impl ScaledRect {
    pub fn new(rect: Rectangle, scale: i32) -> Self {
        Self { rect, scale }
    }

    pub fn to_absolute(&self) -> Rectangle {
        self.rect.scale_up(self.scale)
    }

    /// Absolute position of this rectangle's top-left corner.
    pub fn absolute_origin(&self) -> Point {
        Point::new(self.rect.x * self.scale, self.rect.y * self.scale)
    }

    /// Drops the upper quarter of the rectangle.
    pub fn lower_three_quarters(&self) -> ScaledRect {
        let r = self.rect;
        ScaledRect::new(
            Rectangle::new(r.x, r.y + r.height / 4, r.width, 3 * r.height / 4),
            self.scale,
        )
    }

    pub fn clip_to(&self, bounds: ScreenSize) -> ScaledRect {
        ScaledRect::new(self.rect.clip_to(bounds), self.scale)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: i32,
}

impl Circle {
    pub fn new(center: Point, radius: i32) -> Self {
        Self { center, radius }
    }
}

/// Blob-style detector output. `size` is the blob's radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size }
    }

    pub fn scale_up(self, scale: i32) -> Keypoint {
        let s = scale as f32;
        Keypoint::new(self.x * s, self.y * s, self.size * s)
    }

    pub fn diameter(&self) -> f32 {
        self.size * 2.0
    }
}
