//! Distributed worker: claims queued remix jobs from PostgreSQL and runs
//! them one at a time.

pub mod config;
pub mod poller;
