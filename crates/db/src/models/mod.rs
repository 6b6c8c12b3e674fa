pub mod remix_job;
pub mod status;
