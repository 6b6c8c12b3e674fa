pub mod remix_job_repo;

pub use remix_job_repo::RemixJobRepo;
