//! Natural-language prompts for the sound generation service.

use crate::analysis::ReferenceHint;

/// Length of the generated rhythm loop in seconds.
pub const LOOP_SECS: u32 = 8;

/// Length of the generated transition effect in seconds.
pub const FX_SECS: u32 = 4;

/// Preset label used when the request carries none.
const DEFAULT_STYLE_HINT: &str = "DJ";

/// A prompt plus the clip length to request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPrompt {
    pub text: String,
    pub duration_secs: u32,
}

/// Prompt for the rhythmic loop, seeded with the measured tempo and key.
pub fn rhythm_loop_prompt(
    bpm: f64,
    key: &str,
    style_text: &str,
    preset_style: Option<&str>,
    reference: Option<&ReferenceHint>,
) -> GenerationPrompt {
    let style_hint = preset_style.unwrap_or(DEFAULT_STYLE_HINT);
    let mut text = match whole_bpm(bpm) {
        Some(bpm) => format!("Create a {style_hint} drum loop at {bpm} BPM in key {key}."),
        None => format!("Create a {style_hint} drum loop in key {key}."),
    };
    text.push_str(&format!(" Style: {style_text}."));
    if let Some(hint) = reference {
        let tone = hint.brightness.describe();
        match whole_bpm(hint.bpm) {
            Some(bpm) => text.push_str(&format!(
                " Use the reference track vibe: around {bpm} BPM with a {tone}."
            )),
            None => text.push_str(&format!(" Use the reference track vibe: a {tone}.")),
        }
    }
    GenerationPrompt {
        text,
        duration_secs: LOOP_SECS,
    }
}

/// Rounded tempo, or `None` when estimation found no beat.
fn whole_bpm(bpm: f64) -> Option<i64> {
    let rounded = bpm.round();
    (rounded.is_finite() && rounded >= 1.0).then_some(rounded as i64)
}

/// Prompt for the short transition effect.
pub fn transition_fx_prompt(style_text: &str) -> GenerationPrompt {
    GenerationPrompt {
        text: format!("Create a short EDM FX riser for {style_text}."),
        duration_secs: FX_SECS,
    }
}
