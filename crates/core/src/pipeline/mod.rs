pub mod pipeline_logger;
pub mod session_config;
pub mod tracking_pipeline;
pub mod tracking_session;
