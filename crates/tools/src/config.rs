use std::str::FromStr;
use std::time::Duration;

/// Default ElevenLabs text-to-sound-effects endpoint.
pub const DEFAULT_GENERATION_ENDPOINT: &str =
    "https://api.elevenlabs.io/v1/text-to-sound-effects/convert";

/// Settings for the external tool adapters, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// `ffmpeg` executable (default: `ffmpeg` on `PATH`).
    pub ffmpeg_bin: String,
    /// `demucs` executable (default: `demucs` on `PATH`).
    pub demucs_bin: String,
    /// Wall-clock limit for any single external process.
    pub tool_timeout: Duration,
    /// Limit for a whole download, connect through last byte.
    pub download_timeout: Duration,
    /// Limit for one generation-service call.
    pub generation_timeout: Duration,
    pub generation_endpoint: String,
    /// Sent as `xi-api-key`. Checked when the first generation call is made.
    pub generation_api_key: Option<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".into(),
            demucs_bin: "demucs".into(),
            tool_timeout: Duration::from_secs(1800),
            download_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(60),
            generation_endpoint: DEFAULT_GENERATION_ENDPOINT.into(),
            generation_api_key: None,
        }
    }
}

impl ToolConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `FFMPEG_BIN`              | `ffmpeg`                   |
    /// | `DEMUCS_BIN`              | `demucs`                   |
    /// | `TOOL_TIMEOUT_SECS`       | `1800`                     |
    /// | `DOWNLOAD_TIMEOUT_SECS`   | `60`                       |
    /// | `GENERATION_TIMEOUT_SECS` | `60`                       |
    /// | `GENERATION_ENDPOINT`     | ElevenLabs sound effects   |
    /// | `ELEVENLABS_API_KEY`      | unset                      |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg_bin: env_or("FFMPEG_BIN", defaults.ffmpeg_bin),
            demucs_bin: env_or("DEMUCS_BIN", defaults.demucs_bin),
            tool_timeout: Duration::from_secs(env_or("TOOL_TIMEOUT_SECS", 1800u64)),
            download_timeout: Duration::from_secs(env_or("DOWNLOAD_TIMEOUT_SECS", 60u64)),
            generation_timeout: Duration::from_secs(env_or("GENERATION_TIMEOUT_SECS", 60u64)),
            generation_endpoint: env_or("GENERATION_ENDPOINT", defaults.generation_endpoint),
            generation_api_key: std::env::var("ELEVENLABS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Read and parse `name`, falling back to `default` when unset or invalid.
pub fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
