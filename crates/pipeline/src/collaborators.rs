//! Interfaces the pipeline stages call out through.
//!
//! [`Toolkit`](crate::toolkit::Toolkit) implements all of them with real
//! processes, HTTP calls and object storage.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use remix_core::analysis::{ReferenceHint, TrackAnalysis};
use remix_core::ffmpeg::MixPlan;
use remix_core::prompts::GenerationPrompt;
use remix_core::remix::OutputFormat;
use remix_storage::StorageError;
use remix_tools::demucs::StemFiles;
use remix_tools::ToolError;

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `url` into `dest`.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), ToolError>;
}

#[async_trait]
pub trait AudioAnalyzer: Send + Sync {
    async fn analyze_source(&self, path: &Path) -> Result<TrackAnalysis, ToolError>;
    async fn analyze_reference(&self, path: &Path) -> Result<ReferenceHint, ToolError>;
}

#[async_trait]
pub trait StemSeparator: Send + Sync {
    /// Split `input` into stems under `out_dir`, reporting which were found.
    async fn separate(&self, input: &Path, out_dir: &Path) -> Result<StemFiles, ToolError>;
}

#[async_trait]
pub trait SoundGenerator: Send + Sync {
    /// Render `prompt` into an audio clip at `output`.
    async fn generate(&self, prompt: &GenerationPrompt, output: &Path) -> Result<(), ToolError>;
}

#[async_trait]
pub trait AudioMixer: Send + Sync {
    async fn mix(&self, plan: &MixPlan) -> Result<(), ToolError>;
    async fn transcode(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<(), ToolError>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload the file and return a locator clients can read it from.
    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> Result<String, StorageError>;
}

/// The full set of collaborators a runner needs.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn MediaFetcher>,
    pub analyzer: Arc<dyn AudioAnalyzer>,
    pub separator: Arc<dyn StemSeparator>,
    pub generator: Arc<dyn SoundGenerator>,
    pub mixer: Arc<dyn AudioMixer>,
    pub artifacts: Arc<dyn ArtifactStore>,
}

impl Collaborators {
    /// Use one value for every role.
    pub fn uniform<T>(all: Arc<T>) -> Self
    where
        T: MediaFetcher + AudioAnalyzer + StemSeparator + SoundGenerator + AudioMixer + ArtifactStore + 'static,
    {
        Self {
            fetcher: all.clone(),
            analyzer: all.clone(),
            separator: all.clone(),
            generator: all.clone(),
            mixer: all.clone(),
            artifacts: all,
        }
    }
}
