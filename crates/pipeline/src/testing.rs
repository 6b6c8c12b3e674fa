//! Fakes shared by the crate's unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use remix_core::analysis::{Brightness, ReferenceHint, TrackAnalysis};
use remix_core::ffmpeg::MixPlan;
use remix_core::job::{Job, JobUpdate};
use remix_core::prompts::GenerationPrompt;
use remix_core::remix::{OutputFormat, RemixSpec};
use remix_core::types::JobId;
use remix_storage::StorageError;
use remix_tools::demucs::StemFiles;
use remix_tools::ToolError;

use crate::collaborators::{
    ArtifactStore, AudioAnalyzer, AudioMixer, MediaFetcher, SoundGenerator, StemSeparator,
};
use crate::error::StoreError;
use crate::store::{InMemoryJobStore, JobStore};

pub fn spec() -> RemixSpec {
    RemixSpec {
        source_url: "https://files.example.com/uploads/a.wav".into(),
        reference_url: None,
        style_text: "late-night warehouse".into(),
        preset_style: Some("techno".into()),
        output_format: OutputFormat::Mp3,
        preview: false,
        target_bpm: None,
    }
}

/// In-memory store that also remembers every progress value written.
#[derive(Default)]
pub struct RecordingStore {
    /// Answer every `Finish` with a database error.
    pub reject_finish: bool,
    /// Answer this many `Start` updates with a database error first.
    pub failing_starts: AtomicUsize,
    pub(crate) inner: InMemoryJobStore,
    pub(crate) ids: Mutex<Vec<JobId>>,
    pub(crate) history: Mutex<Vec<u8>>,
}

impl RecordingStore {
    pub fn progress_history(&self) -> Vec<u8> {
        self.history.lock().unwrap().clone()
    }

    pub async fn single_job(&self) -> Job {
        let id = {
            let ids = self.ids.lock().unwrap();
            assert_eq!(ids.len(), 1);
            ids[0]
        };
        self.inner.get(id).await.unwrap()
    }
}

#[async_trait]
impl JobStore for RecordingStore {
    async fn create(&self, spec: &RemixSpec) -> Result<JobId, StoreError> {
        let id = self.inner.create(spec).await?;
        self.ids.lock().unwrap().push(id);
        Ok(id)
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        self.inner.get(id).await
    }

    async fn update(&self, id: JobId, update: JobUpdate) -> Result<Job, StoreError> {
        if self.reject_finish && matches!(update, JobUpdate::Finish(_)) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        if matches!(update, JobUpdate::Start)
            && self
                .failing_starts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let recorded = match &update {
            JobUpdate::Progress(value) => Some(*value),
            JobUpdate::Finish(_) => Some(100),
            _ => None,
        };
        let job = self.inner.update(id, update).await?;
        if let Some(value) = recorded {
            self.history.lock().unwrap().push(value);
        }
        Ok(job)
    }
}

/// Collaborators that write placeholder files instead of doing real work.
pub struct FakeStudio {
    pub emit_instrumental: bool,
    pub emit_vocals: bool,
    pub fail_fetch: bool,
    pub fail_generation: bool,
    pub source_secs: f64,
    /// How long each fetch takes; used to hold pool slots busy.
    pub fetch_delay: Duration,
    pub(crate) active_fetches: AtomicUsize,
    pub(crate) peak_fetches: AtomicUsize,
    pub(crate) working_dir: Mutex<Option<PathBuf>>,
    pub(crate) plan: Mutex<Option<MixPlan>>,
    pub(crate) prompts: Mutex<Vec<GenerationPrompt>>,
    pub(crate) transcodes: AtomicUsize,
}

impl Default for FakeStudio {
    fn default() -> Self {
        Self {
            emit_instrumental: true,
            emit_vocals: true,
            fail_fetch: false,
            fail_generation: false,
            source_secs: 180.0,
            fetch_delay: Duration::ZERO,
            active_fetches: AtomicUsize::new(0),
            peak_fetches: AtomicUsize::new(0),
            working_dir: Mutex::new(None),
            plan: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            transcodes: AtomicUsize::new(0),
        }
    }
}

impl FakeStudio {
    pub fn working_dir(&self) -> Option<PathBuf> {
        self.working_dir.lock().unwrap().clone()
    }

    pub fn mix_plan(&self) -> Option<MixPlan> {
        self.plan.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<GenerationPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Highest number of fetches observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_fetches.load(Ordering::SeqCst)
    }

    pub fn transcode_calls(&self) -> usize {
        self.transcodes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for FakeStudio {
    async fn fetch(&self, _url: &str, dest: &Path) -> Result<(), ToolError> {
        *self.working_dir.lock().unwrap() = dest.parent().map(Path::to_path_buf);
        let active = self.active_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_fetches.fetch_max(active, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.active_fetches.fetch_sub(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(ToolError::Api {
                status: 404,
                body: "no such object".into(),
            });
        }
        std::fs::write(dest, b"RIFF")?;
        Ok(())
    }
}

#[async_trait]
impl AudioAnalyzer for FakeStudio {
    async fn analyze_source(&self, _path: &Path) -> Result<TrackAnalysis, ToolError> {
        Ok(TrackAnalysis {
            bpm: 100.0,
            key: "A".into(),
            duration_secs: self.source_secs,
        })
    }

    async fn analyze_reference(&self, _path: &Path) -> Result<ReferenceHint, ToolError> {
        Ok(ReferenceHint {
            bpm: 124.0,
            brightness: Brightness::Bright,
        })
    }
}

#[async_trait]
impl StemSeparator for FakeStudio {
    async fn separate(&self, _input: &Path, out_dir: &Path) -> Result<StemFiles, ToolError> {
        let dir = out_dir.join("htdemucs").join("original");
        std::fs::create_dir_all(&dir)?;
        let mut stems = StemFiles::default();
        if self.emit_instrumental {
            let path = dir.join("no_vocals.wav");
            std::fs::write(&path, b"RIFF")?;
            stems.instrumental = Some(path);
        }
        if self.emit_vocals {
            let path = dir.join("vocals.wav");
            std::fs::write(&path, b"RIFF")?;
            stems.vocals = Some(path);
        }
        Ok(stems)
    }
}

#[async_trait]
impl SoundGenerator for FakeStudio {
    async fn generate(&self, prompt: &GenerationPrompt, output: &Path) -> Result<(), ToolError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        if self.fail_generation {
            return Err(ToolError::Api {
                status: 500,
                body: "internal error".into(),
            });
        }
        std::fs::write(output, b"ID3")?;
        Ok(())
    }
}

#[async_trait]
impl AudioMixer for FakeStudio {
    async fn mix(&self, plan: &MixPlan) -> Result<(), ToolError> {
        *self.plan.lock().unwrap() = Some(plan.clone());
        std::fs::write(&plan.output, b"RIFF")?;
        Ok(())
    }

    async fn transcode(&self, _input: &Path, output: &Path, _format: OutputFormat) -> Result<(), ToolError> {
        self.transcodes.fetch_add(1, Ordering::SeqCst);
        std::fs::write(output, b"ID3")?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FakeStudio {
    async fn upload(&self, path: &Path, key: &str, _content_type: &str) -> Result<String, StorageError> {
        assert!(path.exists());
        Ok(format!("https://cdn.test/{key}"))
    }
}
