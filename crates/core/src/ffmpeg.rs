//! FFmpeg command-line builders for mixing, transcoding, and decoding.
//!
//! Only argument vectors are produced here; spawning the process is the job
//! of the tools crate. Keeping the builders pure lets the filter graphs be
//! tested without an ffmpeg binary.

use std::path::{Path, PathBuf};

use crate::remix::{OutputFormat, PREVIEW_SECS};
use crate::tempo;

/// Bitrate used for mp3 transcodes.
pub const MP3_BITRATE: &str = "192k";

/// Sample rate used when decoding audio for analysis.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Longest stretch of audio decoded for analysis. Tempo and key settle well
/// before this, and it keeps the decoded buffer near 50 MiB.
pub const ANALYSIS_WINDOW_SECS: u32 = 600;

/// Fade length (seconds) when an `amix` input ends.
const DROPOUT_TRANSITION_SECS: u32 = 2;

/// Everything needed to render the final mix.
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlan {
    /// Mandatory non-vocal stem.
    pub instrumental: PathBuf,
    /// Optional vocal stem; omitted from the mix when absent.
    pub vocals: Option<PathBuf>,
    /// Generated clips, looped indefinitely to cover the output length.
    pub loops: Vec<PathBuf>,
    /// Length of the rendered output in seconds.
    pub duration_secs: f64,
    /// Pitch-preserving tempo change applied to the stems.
    pub stretch_ratio: f64,
    /// Effect chain (ffmpeg filter syntax) applied after mixing.
    pub effects: Option<&'static str>,
    pub output: PathBuf,
}

impl MixPlan {
    /// Number of inputs fed into `amix`.
    pub fn input_count(&self) -> usize {
        1 + usize::from(self.vocals.is_some()) + self.loops.len()
    }
}

/// Output length: the source duration, capped at [`PREVIEW_SECS`] for
/// previews.
pub fn mix_duration(source_secs: f64, preview: bool) -> f64 {
    let source_secs = source_secs.max(0.0);
    if preview {
        source_secs.min(PREVIEW_SECS as f64)
    } else {
        source_secs
    }
}

/// Effect chain for a preset tag, or `None` for unknown/absent presets.
pub fn style_effects(preset: Option<&str>) -> Option<&'static str> {
    match preset?.trim().to_ascii_lowercase().as_str() {
        "house" => Some("acompressor=threshold=-12dB:ratio=4,highpass=f=100"),
        "techno" => Some("acrusher=bits=12:mode=lin,acompressor=threshold=-10dB:ratio=6"),
        "trance" => Some("aecho=0.8:0.88:60|120:0.4|0.3"),
        "drum-n-bass" | "dnb" => Some("acompressor=threshold=-15dB:ratio=8"),
        _ => None,
    }
}

/// Build the `-filter_complex` graph for a mix plan. The graph's final
/// output is labelled `[out]`.
pub fn mix_filter_graph(plan: &MixPlan) -> String {
    let stems = 1 + usize::from(plan.vocals.is_some());
    let inputs = plan.input_count();
    let stretch = !tempo::is_unity(plan.stretch_ratio);

    let mut graph = String::new();
    let mut labels = String::new();

    for idx in 0..inputs {
        if idx < stems && stretch {
            graph.push_str(&format!(
                "[{idx}:a]atempo={:.6}[s{idx}];",
                plan.stretch_ratio
            ));
            labels.push_str(&format!("[s{idx}]"));
        } else {
            labels.push_str(&format!("[{idx}:a]"));
        }
    }

    graph.push_str(&format!(
        "{labels}amix=inputs={inputs}:duration=longest:dropout_transition={DROPOUT_TRANSITION_SECS}"
    ));

    match plan.effects {
        Some(chain) => graph.push_str(&format!(",{chain}[out]")),
        None => graph.push_str("[out]"),
    }
    graph
}

/// Arguments for rendering `plan` to a wav file.
pub fn mix_args(plan: &MixPlan) -> Vec<String> {
    let mut args = vec!["-y".to_string(), "-i".to_string(), path_arg(&plan.instrumental)];

    if let Some(vocals) = &plan.vocals {
        args.push("-i".into());
        args.push(path_arg(vocals));
    }

    for clip in &plan.loops {
        args.extend(["-stream_loop".into(), "-1".into(), "-i".into(), path_arg(clip)]);
    }

    args.extend([
        "-filter_complex".into(),
        mix_filter_graph(plan),
        "-map".into(),
        "[out]".into(),
        "-t".into(),
        format!("{:.3}", plan.duration_secs),
        path_arg(&plan.output),
    ]);
    args
}

/// Arguments for transcoding `input` into `format` at `output`.
pub fn transcode_args(input: &Path, output: &Path, format: OutputFormat) -> Vec<String> {
    let mut args = vec!["-y".to_string(), "-i".to_string(), path_arg(input)];
    match format {
        OutputFormat::Mp3 => {
            args.extend([
                "-codec:a".into(),
                "libmp3lame".into(),
                "-b:a".into(),
                MP3_BITRATE.into(),
            ]);
        }
        OutputFormat::Wav => {
            args.extend(["-codec:a".into(), "pcm_s16le".into()]);
        }
    }
    args.push(path_arg(output));
    args
}

/// Arguments for decoding the first [`ANALYSIS_WINDOW_SECS`] of `input` to
/// mono little-endian `f32` PCM on stdout.
///
/// Logging stays at `info` so stderr carries the container's `Duration:`
/// line (see [`parse_duration`]).
pub fn decode_pcm_args(input: &Path, sample_rate: u32) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-nostats".into(),
        "-v".into(),
        "info".into(),
        "-i".into(),
        path_arg(input),
        "-t".into(),
        ANALYSIS_WINDOW_SECS.to_string(),
        "-ac".into(),
        "1".into(),
        "-ar".into(),
        sample_rate.to_string(),
        "-f".into(),
        "f32le".into(),
        "-".into(),
    ]
}

/// Reinterpret raw little-endian `f32` bytes as samples. A trailing partial
/// sample is dropped.
pub fn pcm_from_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Read the input duration from ffmpeg's `Duration: HH:MM:SS.ss` line.
/// Returns `None` when the line is missing or reads `N/A`.
pub fn parse_duration(stderr: &str) -> Option<f64> {
    let rest = stderr.split("Duration: ").nth(1)?;
    let stamp = rest.split(',').next()?.trim();
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
