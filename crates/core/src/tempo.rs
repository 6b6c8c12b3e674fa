//! Tempo targeting and time-stretch ratio limits.

/// Slowest allowed stretch ratio.
pub const MIN_STRETCH_RATIO: f64 = 0.8;

/// Fastest allowed stretch ratio.
pub const MAX_STRETCH_RATIO: f64 = 1.2;

/// Ratios this close to 1.0 are treated as "no stretch".
const UNITY_EPSILON: f64 = 1e-3;

/// Choose the tempo the remix should land on.
///
/// An explicit target wins; otherwise the source and reference tempos are
/// averaged when a reference exists; otherwise the source tempo is kept.
pub fn target_tempo(source_bpm: f64, reference_bpm: Option<f64>, explicit: Option<f64>) -> f64 {
    if let Some(bpm) = explicit.filter(|b| b.is_finite() && *b > 0.0) {
        return bpm;
    }
    match reference_bpm.filter(|b| b.is_finite() && *b > 0.0) {
        Some(reference) => (source_bpm + reference) / 2.0,
        None => source_bpm,
    }
}

/// Ratio by which playback speed must change to move from `source_bpm` to
/// `target_bpm`, clamped to `[MIN_STRETCH_RATIO, MAX_STRETCH_RATIO]`.
///
/// A non-positive or non-finite source tempo yields 1.0 (no stretch).
pub fn stretch_ratio(source_bpm: f64, target_bpm: f64) -> f64 {
    if !(source_bpm.is_finite() && source_bpm > 0.0 && target_bpm.is_finite()) {
        return 1.0;
    }
    (target_bpm / source_bpm).clamp(MIN_STRETCH_RATIO, MAX_STRETCH_RATIO)
}

/// Whether `ratio` is close enough to 1.0 that stretching can be skipped.
pub fn is_unity(ratio: f64) -> bool {
    (ratio - 1.0).abs() < UNITY_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_above_limit_is_clamped() {
        // 124 / 100 = 1.24 exceeds the upper bound.
        let ratio = stretch_ratio(100.0, 124.0);
        assert!((ratio - 1.20).abs() < 1e-9);
    }

    #[test]
    fn ratio_below_limit_is_clamped() {
        let ratio = stretch_ratio(150.0, 90.0);
        assert!((ratio - 0.80).abs() < 1e-9);
    }

    #[test]
    fn ratio_within_limits_is_kept() {
        let ratio = stretch_ratio(120.0, 126.0);
        assert!((ratio - 1.05).abs() < 1e-9);
    }

    #[test]
    fn zero_source_tempo_means_no_stretch() {
        assert_eq!(stretch_ratio(0.0, 124.0), 1.0);
        assert_eq!(stretch_ratio(f64::NAN, 124.0), 1.0);
    }

    #[test]
    fn explicit_target_wins() {
        assert_eq!(target_tempo(100.0, Some(140.0), Some(124.0)), 124.0);
    }

    #[test]
    fn reference_tempo_is_averaged() {
        assert_eq!(target_tempo(100.0, Some(140.0), None), 120.0);
    }

    #[test]
    fn source_tempo_kept_without_reference() {
        assert_eq!(target_tempo(97.0, None, None), 97.0);
        assert_eq!(target_tempo(97.0, Some(0.0), None), 97.0);
    }

    #[test]
    fn unity_detection() {
        assert!(is_unity(1.0));
        assert!(is_unity(1.0004));
        assert!(!is_unity(1.05));
    }
}
