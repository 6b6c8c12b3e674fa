//! Remix requests: the immutable input of one pipeline run.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Length of a preview render in seconds.
pub const PREVIEW_SECS: u32 = 30;

/// Container format of the final artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp3,
    Wav,
}

impl OutputFormat {
    /// File extension (and wire name) of the format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// MIME type used when uploading the artifact.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
        }
    }

    /// Parse a user-supplied format name, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            other => Err(CoreError::Validation(format!(
                "Unsupported output format '{other}'. Must be one of: mp3, wav"
            ))),
        }
    }
}

/// Everything a pipeline run needs to know about the requested remix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemixSpec {
    /// Where to fetch the source track from.
    pub source_url: String,
    /// Optional reference track whose feel should be imitated.
    pub reference_url: Option<String>,
    /// Free-text style description.
    pub style_text: String,
    /// Optional preset tag (`house`, `techno`, `trance`, `drum-n-bass`, ...).
    pub preset_style: Option<String>,
    pub output_format: OutputFormat,
    /// Render only [`PREVIEW_SECS`] seconds.
    #[serde(default)]
    pub preview: bool,
    /// Explicit tempo to stretch toward, overriding the blended target.
    #[serde(default)]
    pub target_bpm: Option<f64>,
}

/// Submission payload as received from clients.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitRemix {
    #[validate(url(message = "original_url must be a valid URL"))]
    pub original_url: String,
    #[validate(url(message = "reference_url must be a valid URL"))]
    pub reference_url: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "style_text must be 1-1000 characters"))]
    pub style_text: String,
    #[validate(length(max = 64))]
    pub preset_style: Option<String>,
    pub output_format: Option<String>,
    #[serde(default)]
    pub preview: bool,
    #[validate(range(min = 40.0, max = 240.0, message = "target_bpm must be within 40-240"))]
    pub target_bpm: Option<f64>,
}

impl SubmitRemix {
    /// Validate the payload and turn it into an immutable [`RemixSpec`].
    pub fn into_spec(self) -> Result<RemixSpec, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let output_format = match self.output_format.as_deref() {
            Some(name) => OutputFormat::parse(name)?,
            None => OutputFormat::default(),
        };

        Ok(RemixSpec {
            source_url: self.original_url,
            reference_url: self.reference_url,
            style_text: self.style_text,
            preset_style: self
                .preset_style
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            output_format,
            preview: self.preview,
            target_bpm: self.target_bpm,
        })
    }
}
