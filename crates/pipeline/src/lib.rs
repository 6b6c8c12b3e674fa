//! Job orchestration for remix runs.
//!
//! * [`store`] -- where job state lives (in memory or in PostgreSQL).
//! * [`progress`] -- the narrow write path from a running pipeline into the
//!   store.
//! * [`runner`] -- the six ordered stages of one remix.
//! * [`dispatch`] -- picks the distributed or local backend once and hands
//!   jobs to it.

pub mod collaborators;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod progress;
pub mod runner;
pub mod store;
pub mod toolkit;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Backend, Dispatcher, LocalWorkerPool};
pub use error::{DispatchError, StageError, StoreError};
pub use progress::ProgressReporter;
pub use runner::PipelineRunner;
pub use store::JobStore;
