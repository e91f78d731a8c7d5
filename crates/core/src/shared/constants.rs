/// Downscale divisor of the buffer the face detector searches.
pub const FACE_SCALE: i32 = 8;
/// Consecutive empty face detections tolerated before the face is lost.
pub const FACE_MAX_SKIPPED_FRAMES: u32 = 10;
pub const FACE_CENTER_TOLERANCE: i32 = 16;
pub const FACE_SIDE_TOLERANCE: i32 = 40;

pub const EYE_SCALE: i32 = 4;
/// Consecutive frames with no eye on either side before both eyes are lost.
pub const EYE_MAX_SKIPPED_FRAMES: u32 = 5;
pub const EYE_CENTER_TOLERANCE: i32 = 4;
pub const EYE_SIDE_TOLERANCE: i32 = 8;

pub const PUPIL_SCALE: i32 = 2;
pub const PUPIL_CENTER_TOLERANCE: i32 = 1;
pub const PUPIL_RADIUS_TOLERANCE: i32 = 1;

/// Binary threshold applied to the eye window before blob detection.
pub const DEFAULT_PUPIL_THRESHOLD: u8 = 70;
pub const PUPIL_ERODE_ITERATIONS: usize = 2;
pub const PUPIL_DILATE_ITERATIONS: usize = 4;
pub const PUPIL_MEDIAN_KERNEL: usize = 5;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "pgm"];
