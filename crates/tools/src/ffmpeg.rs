//! Typed wrapper over the `ffmpeg` binary.

use std::path::Path;
use std::time::Duration;

use remix_core::ffmpeg::{self as args, MixPlan};
use remix_core::remix::OutputFormat;

use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::process::run_command;

/// Samples from the start of a file plus the file's total length.
#[derive(Debug, Clone, Default)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    /// Container duration; may exceed what `samples` covers.
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FfmpegTool {
    bin: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.ffmpeg_bin.clone(), config.tool_timeout)
    }

    /// Render a mix plan to its output file.
    pub async fn mix(&self, plan: &MixPlan) -> Result<(), ToolError> {
        run_command(&self.bin, &args::mix_args(plan), self.timeout).await?;
        Ok(())
    }

    /// Transcode `input` into `format` at `output`.
    pub async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
    ) -> Result<(), ToolError> {
        run_command(&self.bin, &args::transcode_args(input, output, format), self.timeout).await?;
        Ok(())
    }

    /// Decode the analysis window of `input` to mono `f32` samples at
    /// `sample_rate`, along with the full input duration when ffmpeg
    /// reports one.
    pub async fn decode_pcm(&self, input: &Path, sample_rate: u32) -> Result<DecodedAudio, ToolError> {
        let out = run_command(&self.bin, &args::decode_pcm_args(input, sample_rate), self.timeout).await?;
        Ok(DecodedAudio {
            samples: args::pcm_from_f32le(&out.stdout),
            duration_secs: args::parse_duration(&out.stderr),
        })
    }
}
