//! Production collaborators: ffmpeg, demucs, the generation service and
//! object storage.

use std::path::Path;

use async_trait::async_trait;
use remix_core::analysis::{self, ReferenceHint, TrackAnalysis};
use remix_core::ffmpeg::{MixPlan, ANALYSIS_SAMPLE_RATE};
use remix_core::prompts::GenerationPrompt;
use remix_core::remix::OutputFormat;
use remix_storage::{ObjectStorage, StorageError};
use remix_tools::demucs::{DemucsTool, StemFiles};
use remix_tools::ffmpeg::{DecodedAudio, FfmpegTool};
use remix_tools::generation::SoundEffectsClient;
use remix_tools::http::HttpClient;
use remix_tools::{ToolConfig, ToolError};

use crate::collaborators::{
    ArtifactStore, AudioAnalyzer, AudioMixer, MediaFetcher, SoundGenerator, StemSeparator,
};

pub struct Toolkit {
    config: ToolConfig,
    http: HttpClient,
    ffmpeg: FfmpegTool,
    demucs: DemucsTool,
    generator: SoundEffectsClient,
    storage: ObjectStorage,
}

impl Toolkit {
    pub fn new(config: ToolConfig, storage: ObjectStorage) -> Self {
        let http = HttpClient::new();
        Self {
            ffmpeg: FfmpegTool::from_config(&config),
            demucs: DemucsTool::from_config(&config),
            generator: SoundEffectsClient::from_config(http.clone(), &config),
            http,
            storage,
            config,
        }
    }

    /// Build from `ToolConfig::from_env` and `ObjectStorage::from_env`.
    pub fn from_env() -> Self {
        Self::new(ToolConfig::from_env(), ObjectStorage::from_env())
    }

    pub fn storage(&self) -> &ObjectStorage {
        &self.storage
    }

    async fn decode(&self, path: &Path) -> Result<DecodedAudio, ToolError> {
        self.ffmpeg.decode_pcm(path, ANALYSIS_SAMPLE_RATE).await
    }
}

/// Analyze the decoded window; the reported length is the whole file's when
/// ffmpeg knows it.
fn analyze_decoded(decoded: DecodedAudio) -> TrackAnalysis {
    let mut track = analysis::analyze_track(&decoded.samples, ANALYSIS_SAMPLE_RATE);
    if let Some(secs) = decoded.duration_secs {
        track.duration_secs = secs;
    }
    track
}

#[async_trait]
impl MediaFetcher for Toolkit {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), ToolError> {
        self.http
            .download(url, dest, self.config.download_timeout)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AudioAnalyzer for Toolkit {
    async fn analyze_source(&self, path: &Path) -> Result<TrackAnalysis, ToolError> {
        let decoded = self.decode(path).await?;
        tokio::task::spawn_blocking(move || analyze_decoded(decoded))
            .await
            .map_err(|e| ToolError::Io(std::io::Error::other(e)))
    }

    async fn analyze_reference(&self, path: &Path) -> Result<ReferenceHint, ToolError> {
        let decoded = self.decode(path).await?;
        tokio::task::spawn_blocking(move || {
            analysis::analyze_reference(&decoded.samples, ANALYSIS_SAMPLE_RATE)
        })
            .await
            .map_err(|e| ToolError::Io(std::io::Error::other(e)))
    }
}

#[async_trait]
impl StemSeparator for Toolkit {
    async fn separate(&self, input: &Path, out_dir: &Path) -> Result<StemFiles, ToolError> {
        self.demucs.separate(input, out_dir).await
    }
}

#[async_trait]
impl SoundGenerator for Toolkit {
    async fn generate(&self, prompt: &GenerationPrompt, output: &Path) -> Result<(), ToolError> {
        self.generator.generate(prompt, output).await?;
        Ok(())
    }
}

#[async_trait]
impl AudioMixer for Toolkit {
    async fn mix(&self, plan: &MixPlan) -> Result<(), ToolError> {
        self.ffmpeg.mix(plan).await
    }

    async fn transcode(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<(), ToolError> {
        self.ffmpeg.transcode(input, output, format).await
    }
}

#[async_trait]
impl ArtifactStore for Toolkit {
    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> Result<String, StorageError> {
        self.storage.upload_file(path, key, content_type).await?;
        // Signed downloads get a time-limited link; otherwise this is the
        // public URL `upload_file` already built.
        self.storage.download_url(key).await
    }
}
