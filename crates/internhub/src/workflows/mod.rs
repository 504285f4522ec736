pub mod jobs;
pub mod plans;
