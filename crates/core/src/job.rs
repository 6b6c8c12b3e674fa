//! Job record and its lifecycle state machine.
//!
//! A job moves strictly forward: `queued -> running -> finished | failed`.
//! Progress never decreases, reaches 100 only together with `finished`, and
//! a terminal job never changes again. Every store implementation funnels its
//! writes through [`Job::apply`] so these rules live in one place.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// Highest progress value; only reachable through [`JobUpdate::Finish`].
pub const PROGRESS_COMPLETE: u8 = 100;

/// Externally visible job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    /// Wire name, e.g. `"queued"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final descriptor of a successful remix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemixResult {
    /// Public (or signed) URL of the uploaded artifact.
    pub output_locator: String,
    /// Container format of the artifact (`mp3` or `wav`).
    pub output_format: String,
    /// Tempo measured on the source track.
    pub bpm: f64,
    /// Estimated key of the source track, e.g. `"A#"`.
    pub key: String,
}

/// The tracked state of one remix run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub result: Option<RemixResult>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A partial update applied by the single writer of a job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// `queued -> running`.
    Start,
    /// Record a stage checkpoint. Must be below 100 and not below the
    /// current value.
    Progress(u8),
    /// `running -> finished`, storing the result and setting progress to 100.
    Finish(RemixResult),
    /// `running -> failed`, storing the message. Progress is left untouched.
    Fail(String),
}

/// An update that the lifecycle rules forbid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("job is already {0} and can no longer change")]
    Terminal(JobStatus),

    #[error("cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("progress cannot go from {current} back to {requested}")]
    ProgressRegression { current: u8, requested: u8 },

    #[error("progress {0} is out of range for a running job (0..=99)")]
    ProgressOutOfRange(u8),
}

impl Job {
    /// A freshly submitted job: `queued` with progress 0.
    pub fn queued(id: JobId, now: Timestamp) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            progress: 0,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether `update` is legal for the current state without
    /// changing anything.
    pub fn check(&self, update: &JobUpdate) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }

        match update {
            JobUpdate::Start => expect_status(self.status, JobStatus::Queued, JobStatus::Running),
            JobUpdate::Progress(value) => {
                expect_status(self.status, JobStatus::Running, JobStatus::Running)?;
                if *value >= PROGRESS_COMPLETE {
                    return Err(TransitionError::ProgressOutOfRange(*value));
                }
                if *value < self.progress {
                    return Err(TransitionError::ProgressRegression {
                        current: self.progress,
                        requested: *value,
                    });
                }
                Ok(())
            }
            JobUpdate::Finish(_) => {
                expect_status(self.status, JobStatus::Running, JobStatus::Finished)
            }
            JobUpdate::Fail(_) => expect_status(self.status, JobStatus::Running, JobStatus::Failed),
        }
    }

    /// Apply `update`, enforcing the lifecycle rules.
    pub fn apply(&mut self, update: JobUpdate, now: Timestamp) -> Result<(), TransitionError> {
        self.check(&update)?;

        match update {
            JobUpdate::Start => self.status = JobStatus::Running,
            JobUpdate::Progress(value) => self.progress = value,
            JobUpdate::Finish(result) => {
                self.status = JobStatus::Finished;
                self.progress = PROGRESS_COMPLETE;
                self.result = Some(result);
            }
            JobUpdate::Fail(message) => {
                self.status = JobStatus::Failed;
                self.error = Some(message);
            }
        }
        self.updated_at = now;
        Ok(())
    }
}

fn expect_status(
    current: JobStatus,
    required: JobStatus,
    target: JobStatus,
) -> Result<(), TransitionError> {
    if current == required {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition {
            from: current,
            to: target,
        })
    }
}
