pub mod skip_budget;
pub mod stabilized_region;
