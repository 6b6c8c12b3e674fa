//! Adapters for everything the remix pipeline runs out of process.
//!
//! * [`process`] -- run an executable to completion with captured stderr
//!   and a wall-clock timeout.
//! * [`http`] -- streaming downloads and request/response service calls.
//! * [`generation`] -- the text-to-sound-effects service client.
//! * [`ffmpeg`] and [`demucs`] -- typed wrappers over the mixing and
//!   stem-separation command-line tools.
//!
//! Every failure is reported as a [`ToolError`].

pub mod config;
pub mod demucs;
pub mod error;
pub mod ffmpeg;
pub mod generation;
pub mod http;
pub mod process;

pub use config::ToolConfig;
pub use error::ToolError;
