//! Lightweight tempo, key, and brightness estimation on decoded PCM.
//!
//! Input is mono `f32` samples at a known sample rate (the tools crate
//! decodes files with ffmpeg before calling in here). The estimators are
//! simple: an onset-envelope autocorrelation for tempo, a
//! Goertzel pitch-class profile for key, and a zero-crossing rate for
//! brightness.

use std::f64::consts::PI;

/// Pitch-class names, indexed from C.
pub const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Analysis frames per second of audio.
const FRAMES_PER_SEC: usize = 100;

/// Tempo search range.
const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 200.0;

/// Centre and width (in octaves) of the tempo prior, which breaks ties
/// between a tempo and its half/double.
const PRIOR_BPM: f64 = 120.0;
const PRIOR_OCTAVES: f64 = 1.0;

/// MIDI note range scanned for the pitch-class profile (C3..B5).
const KEY_MIDI_LOW: u8 = 48;
const KEY_MIDI_HIGH: u8 = 83;

/// At most this many seconds are used for key and brightness estimation.
const MAX_PROFILE_SECS: usize = 120;

/// Measurements taken from the source track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackAnalysis {
    pub bpm: f64,
    pub key: String,
    pub duration_secs: f64,
}

/// Rough tonal colour of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brightness {
    Dark,
    Balanced,
    Bright,
}

impl Brightness {
    /// Phrase used in generation prompts.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Dark => "dark, warm tone",
            Self::Balanced => "balanced tone",
            Self::Bright => "bright, airy tone",
        }
    }
}

/// Secondary hint derived from a reference track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceHint {
    pub bpm: f64,
    pub brightness: Brightness,
}

/// Duration in seconds of `sample_count` samples.
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / sample_rate as f64
}

/// Analyze a full track.
pub fn analyze_track(samples: &[f32], sample_rate: u32) -> TrackAnalysis {
    TrackAnalysis {
        bpm: estimate_tempo(samples, sample_rate),
        key: estimate_key(samples, sample_rate).to_string(),
        duration_secs: duration_secs(samples.len(), sample_rate),
    }
}

/// Analyze a reference track for the prompt hint.
pub fn analyze_reference(samples: &[f32], sample_rate: u32) -> ReferenceHint {
    ReferenceHint {
        bpm: estimate_tempo(samples, sample_rate),
        brightness: estimate_brightness(samples, sample_rate),
    }
}

/// Estimate tempo in BPM. Returns 0.0 when the signal is too short or has
/// no rhythmic content.
pub fn estimate_tempo(samples: &[f32], sample_rate: u32) -> f64 {
    let hop = (sample_rate as usize / FRAMES_PER_SEC).max(1);
    let onsets = onset_envelope(samples, hop);

    let fps = sample_rate as f64 / hop as f64;
    let min_lag = (60.0 * fps / MAX_BPM).floor().max(1.0) as usize;
    let max_lag = (60.0 * fps / MIN_BPM).ceil() as usize;
    if onsets.len() <= max_lag + 1 {
        return 0.0;
    }

    let scores: Vec<f64> = (0..=max_lag + 1)
        .map(|lag| autocorrelation(&onsets, lag))
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let raw = scores[lag];
        if raw <= 0.0 {
            continue;
        }
        let weighted = raw * tempo_prior(60.0 * fps / lag as f64);
        match best {
            Some((_, score)) if score >= weighted => {}
            _ => best = Some((lag, weighted)),
        }
    }

    let Some((lag, _)) = best else {
        return 0.0;
    };

    // Parabolic interpolation around the peak for sub-frame precision.
    let (left, centre, right) = (scores[lag - 1], scores[lag], scores[lag + 1]);
    let denom = left - 2.0 * centre + right;
    let offset = if denom.abs() > f64::EPSILON {
        (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    60.0 * fps / (lag as f64 + offset)
}

/// Estimate the dominant pitch class of the signal.
pub fn estimate_key(samples: &[f32], sample_rate: u32) -> &'static str {
    let profile = chroma_profile(samples, sample_rate);
    let index = profile
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    KEY_NAMES[index]
}

/// Classify the tonal brightness from the zero-crossing rate.
pub fn estimate_brightness(samples: &[f32], sample_rate: u32) -> Brightness {
    let window = profile_window(samples, sample_rate);
    if window.len() < 2 || sample_rate == 0 {
        return Brightness::Balanced;
    }
    let crossings = window
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    // Each period of a tone crosses zero twice.
    let dominant_hz = crossings as f64 / 2.0 / duration_secs(window.len(), sample_rate);
    if dominant_hz < 500.0 {
        Brightness::Dark
    } else if dominant_hz > 1500.0 {
        Brightness::Bright
    } else {
        Brightness::Balanced
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Half-wave rectified frame-to-frame RMS increase, mean-removed.
fn onset_envelope(samples: &[f32], hop: usize) -> Vec<f64> {
    let energies: Vec<f64> = samples
        .chunks(hop)
        .map(|frame| {
            let sum: f64 = frame.iter().map(|s| (*s as f64) * (*s as f64)).sum();
            (sum / frame.len() as f64).sqrt()
        })
        .collect();

    let mut onsets: Vec<f64> = std::iter::once(0.0)
        .chain(energies.windows(2).map(|w| (w[1] - w[0]).max(0.0)))
        .collect();

    let mean = onsets.iter().sum::<f64>() / onsets.len().max(1) as f64;
    for value in &mut onsets {
        *value -= mean;
    }
    onsets
}

/// Length-normalised autocorrelation at `lag`.
fn autocorrelation(signal: &[f64], lag: usize) -> f64 {
    if lag >= signal.len() {
        return 0.0;
    }
    let n = signal.len() - lag;
    let sum: f64 = signal[..n]
        .iter()
        .zip(&signal[lag..])
        .map(|(a, b)| a * b)
        .sum();
    sum / n as f64
}

/// Log-normal preference for tempos near [`PRIOR_BPM`].
fn tempo_prior(bpm: f64) -> f64 {
    let octaves = (bpm / PRIOR_BPM).log2() / PRIOR_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

fn profile_window(samples: &[f32], sample_rate: u32) -> &[f32] {
    let limit = MAX_PROFILE_SECS * sample_rate as usize;
    &samples[..samples.len().min(limit)]
}

/// Energy per pitch class, summed over the scanned octaves.
fn chroma_profile(samples: &[f32], sample_rate: u32) -> [f64; 12] {
    let mut profile = [0.0f64; 12];
    let window = profile_window(samples, sample_rate);
    if window.is_empty() || sample_rate == 0 {
        return profile;
    }
    let nyquist = sample_rate as f64 / 2.0;

    for midi in KEY_MIDI_LOW..=KEY_MIDI_HIGH {
        let freq = 440.0 * 2f64.powf((midi as f64 - 69.0) / 12.0);
        if freq >= nyquist {
            break;
        }
        profile[(midi % 12) as usize] += goertzel_power(window, sample_rate, freq);
    }
    profile
}

/// Power of a single frequency component via the Goertzel recurrence.
fn goertzel_power(samples: &[f32], sample_rate: u32, freq: f64) -> f64 {
    let coeff = 2.0 * (2.0 * PI * freq / sample_rate as f64).cos();
    let (mut s1, mut s2) = (0.0f64, 0.0f64);
    for sample in samples {
        let s0 = *sample as f64 + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    (s1 * s1 + s2 * s2 - coeff * s1 * s2) / samples.len() as f64
}
