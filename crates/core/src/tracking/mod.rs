pub mod candidates;
pub mod domain;
pub mod eye_stage;
pub mod face_stage;
pub mod pair;
pub mod pupil_filter;
pub mod pupil_stage;
pub mod pupil_threshold;
pub mod stage_config;
