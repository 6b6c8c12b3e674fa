//! The six ordered stages of a remix run.
//!
//! Each stage returns its outputs or a [`StageError`]; the first error stops
//! the run, the job is marked failed with that message, and progress stays at
//! the last completed checkpoint. The working directory is removed on every
//! exit path.

use std::future::Future;
use std::path::PathBuf;

use remix_core::analysis::{ReferenceHint, TrackAnalysis};
use remix_core::ffmpeg::{self, MixPlan};
use remix_core::job::RemixResult;
use remix_core::prompts;
use remix_core::remix::{OutputFormat, RemixSpec};
use remix_core::stage::{Stage, CHECKPOINT_TRANSCODED};
use remix_core::tempo;
use remix_storage::keys;
use tracing::Instrument;

use crate::collaborators::Collaborators;
use crate::context::PipelineContext;
use crate::error::StageError;
use crate::progress::ProgressReporter;

/// Outputs of the analyze stage.
struct Analysis {
    track: TrackAnalysis,
    stretch_ratio: f64,
    reference: Option<ReferenceHint>,
}

/// Outputs of the separate stage.
struct Stems {
    instrumental: PathBuf,
    vocals: Option<PathBuf>,
}

/// Runs remixes with a fixed set of collaborators.
#[derive(Clone)]
pub struct PipelineRunner {
    collab: Collaborators,
}

impl PipelineRunner {
    pub fn new(collab: Collaborators) -> Self {
        Self { collab }
    }

    /// Run every stage for a job that is already `running`.
    ///
    /// On success the result is recorded (progress 100) before returning.
    /// On failure the job is marked failed with the stage's message.
    pub async fn run(&self, spec: &RemixSpec, reporter: &ProgressReporter) -> Result<RemixResult, StageError> {
        let job_id = reporter.job_id();
        let outcome = match PipelineContext::create() {
            Ok(ctx) => {
                tracing::debug!(%job_id, dir = %ctx.root().display(), "Working directory created");
                // `ctx` is dropped at the end of this arm, removing the directory.
                self.run_stages(spec, &ctx, reporter).await
            }
            Err(e) => Err(StageError::new(Stage::Fetch, format!("cannot create working directory: {e}"))),
        };

        let outcome = match outcome {
            Ok(result) => reporter
                .finish(result.clone())
                .await
                .map(|()| result)
                .map_err(|e| StageError::new(Stage::Finalize, format!("cannot record result: {e}"))),
            Err(err) => Err(err),
        };

        if let Err(err) = &outcome {
            if let Err(store_err) = reporter.fail(err.to_string()).await {
                tracing::error!(%job_id, error = %store_err, "Failed to record job failure");
            }
        }
        outcome
    }

    async fn run_stages(
        &self,
        spec: &RemixSpec,
        ctx: &PipelineContext,
        reporter: &ProgressReporter,
    ) -> Result<RemixResult, StageError> {
        let (source, reference) = stage(Stage::Fetch, reporter, self.fetch(spec, ctx)).await?;
        let analysis = stage(
            Stage::Analyze,
            reporter,
            self.analyze(spec, &source, reference.as_ref()),
        )
        .await?;
        let stems = stage(Stage::Separate, reporter, self.separate(ctx, &source)).await?;
        let clips = stage(Stage::Generate, reporter, self.generate(spec, ctx, &analysis)).await?;
        let mixed = stage(Stage::Mix, reporter, self.mix(spec, ctx, &analysis, stems, clips)).await?;

        let span = tracing::info_span!("stage", job_id = %reporter.job_id(), stage = %Stage::Finalize);
        self.finalize(spec, ctx, &analysis, mixed, reporter)
            .instrument(span)
            .await
    }

    async fn fetch(
        &self,
        spec: &RemixSpec,
        ctx: &PipelineContext,
    ) -> Result<(PathBuf, Option<PathBuf>), StageError> {
        let source = ctx.path("original.wav");
        self.collab
            .fetcher
            .fetch(&spec.source_url, &source)
            .await
            .map_err(|e| StageError::new(Stage::Fetch, format!("source download failed: {e}")))?;

        let reference = match &spec.reference_url {
            Some(url) => {
                let path = ctx.path("reference.wav");
                self.collab.fetcher.fetch(url, &path).await.map_err(|e| {
                    StageError::new(Stage::Fetch, format!("reference download failed: {e}"))
                })?;
                Some(path)
            }
            None => None,
        };
        Ok((source, reference))
    }

    async fn analyze(
        &self,
        spec: &RemixSpec,
        source: &std::path::Path,
        reference: Option<&PathBuf>,
    ) -> Result<Analysis, StageError> {
        let track = self
            .collab
            .analyzer
            .analyze_source(source)
            .await
            .map_err(|e| StageError::new(Stage::Analyze, e))?;

        let reference = match reference {
            Some(path) => Some(
                self.collab
                    .analyzer
                    .analyze_reference(path)
                    .await
                    .map_err(|e| StageError::new(Stage::Analyze, e))?,
            ),
            None => None,
        };

        let target = tempo::target_tempo(track.bpm, reference.map(|r| r.bpm), spec.target_bpm);
        let stretch_ratio = tempo::stretch_ratio(track.bpm, target);
        tracing::info!(
            bpm = track.bpm,
            key = %track.key,
            duration_secs = track.duration_secs,
            target_bpm = target,
            stretch_ratio,
            "Source analyzed"
        );

        Ok(Analysis {
            track,
            stretch_ratio,
            reference,
        })
    }

    async fn separate(&self, ctx: &PipelineContext, source: &std::path::Path) -> Result<Stems, StageError> {
        let files = self
            .collab
            .separator
            .separate(source, &ctx.path("stems"))
            .await
            .map_err(|e| StageError::new(Stage::Separate, e))?;

        let instrumental = files.instrumental.ok_or_else(|| {
            StageError::new(Stage::Separate, "stem separation produced no instrumental track")
        })?;
        if files.vocals.is_none() {
            tracing::warn!("No vocal stem found, mixing without vocals");
        }
        Ok(Stems {
            instrumental,
            vocals: files.vocals,
        })
    }

    /// Both calls run one after the other.
    async fn generate(
        &self,
        spec: &RemixSpec,
        ctx: &PipelineContext,
        analysis: &Analysis,
    ) -> Result<Vec<PathBuf>, StageError> {
        let loop_prompt = prompts::rhythm_loop_prompt(
            analysis.track.bpm,
            &analysis.track.key,
            &spec.style_text,
            spec.preset_style.as_deref(),
            analysis.reference.as_ref(),
        );
        let fx_prompt = prompts::transition_fx_prompt(&spec.style_text);

        let mut clips = Vec::with_capacity(2);
        for (prompt, name) in [(loop_prompt, "drums.mp3"), (fx_prompt, "fx.mp3")] {
            let path = ctx.path(name);
            self.collab
                .generator
                .generate(&prompt, &path)
                .await
                .map_err(|e| StageError::new(Stage::Generate, e))?;
            clips.push(path);
        }
        Ok(clips)
    }

    async fn mix(
        &self,
        spec: &RemixSpec,
        ctx: &PipelineContext,
        analysis: &Analysis,
        stems: Stems,
        clips: Vec<PathBuf>,
    ) -> Result<PathBuf, StageError> {
        let plan = MixPlan {
            instrumental: stems.instrumental,
            vocals: stems.vocals,
            loops: clips,
            duration_secs: ffmpeg::mix_duration(analysis.track.duration_secs, spec.preview),
            stretch_ratio: analysis.stretch_ratio,
            effects: ffmpeg::style_effects(spec.preset_style.as_deref()),
            output: ctx.path("remix.wav"),
        };
        tracing::debug!(inputs = plan.input_count(), duration_secs = plan.duration_secs, "Mixing");

        self.collab
            .mixer
            .mix(&plan)
            .await
            .map_err(|e| StageError::new(Stage::Mix, e))?;
        Ok(plan.output)
    }

    async fn finalize(
        &self,
        spec: &RemixSpec,
        ctx: &PipelineContext,
        analysis: &Analysis,
        mixed: PathBuf,
        reporter: &ProgressReporter,
    ) -> Result<RemixResult, StageError> {
        let format = spec.output_format;
        let artifact = match format {
            OutputFormat::Wav => mixed,
            OutputFormat::Mp3 => {
                let out = ctx.path("remix.mp3");
                self.collab
                    .mixer
                    .transcode(&mixed, &out, format)
                    .await
                    .map_err(|e| StageError::new(Stage::Finalize, e))?;
                out
            }
        };
        reporter
            .report(CHECKPOINT_TRANSCODED)
            .await
            .map_err(|e| StageError::new(Stage::Finalize, e))?;

        let key = keys::output_key(format.extension());
        let locator = self
            .collab
            .artifacts
            .upload(&artifact, &key, format.content_type())
            .await
            .map_err(|e| StageError::new(Stage::Finalize, format!("upload failed: {e}")))?;

        Ok(RemixResult {
            output_locator: locator,
            output_format: format.extension().to_string(),
            bpm: analysis.track.bpm,
            key: analysis.track.key.clone(),
        })
    }
}

/// Run one stage inside a tracing span and record its checkpoint on success.
async fn stage<T, F>(stage: Stage, reporter: &ProgressReporter, work: F) -> Result<T, StageError>
where
    F: Future<Output = Result<T, StageError>>,
{
    let span = tracing::info_span!("stage", job_id = %reporter.job_id(), stage = %stage);
    async {
        tracing::info!("Stage started");
        let output = work.await.inspect_err(|e| {
            tracing::warn!(error = %e.message, "Stage failed");
        })?;
        reporter
            .report(stage.checkpoint())
            .await
            .map_err(|e| StageError::new(stage, format!("cannot record progress: {e}")))?;
        tracing::info!(progress = stage.checkpoint(), "Stage completed");
        Ok(output)
    }
    .instrument(span)
    .await
}
