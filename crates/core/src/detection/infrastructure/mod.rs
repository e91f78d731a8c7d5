pub mod blob_detector;
pub mod replay_detector;
