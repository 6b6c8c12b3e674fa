//! Domain logic for the remix service.
//!
//! Pure types and functions shared by every other crate: the job model and
//! its state machine, the remix request, stage checkpoints, tempo and key
//! analysis math, prompt construction, and ffmpeg argument building. Nothing
//! here touches the network or a database.

pub mod analysis;
pub mod error;
pub mod ffmpeg;
pub mod job;
pub mod prompts;
pub mod remix;
pub mod stage;
pub mod tempo;
pub mod types;
