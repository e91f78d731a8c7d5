pub mod constants;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod scaled_frame;
