//! S3-compatible object storage for uploads and rendered artifacts.
//!
//! Credentials are read once from the environment but only checked when an
//! operation needs them, so a process without storage configured still
//! starts and fails the first upload or signing request instead.

pub mod config;
pub mod error;
pub mod keys;
pub mod s3;

pub use config::StorageSettings;
pub use error::StorageError;
pub use s3::{ObjectStorage, SignedUpload};
