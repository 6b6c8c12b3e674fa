//! Stem separation through the `demucs` command-line tool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::process::run_command;

/// File name demucs gives the non-vocal stem in two-stem mode.
pub const INSTRUMENTAL_FILE: &str = "no_vocals.wav";

/// File name demucs gives the vocal stem in two-stem mode.
pub const VOCALS_FILE: &str = "vocals.wav";

/// Stems found under the output directory after a successful run.
///
/// Presence is reported as-is; deciding what is mandatory is up to the
/// caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StemFiles {
    pub instrumental: Option<PathBuf>,
    pub vocals: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DemucsTool {
    bin: String,
    timeout: Duration,
}

impl DemucsTool {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.demucs_bin.clone(), config.tool_timeout)
    }

    /// Split `input` into vocal / non-vocal stems under `out_dir`.
    pub async fn separate(&self, input: &Path, out_dir: &Path) -> Result<StemFiles, ToolError> {
        tokio::fs::create_dir_all(out_dir).await?;

        let args = [
            "--two-stems=vocals".to_string(),
            "-o".to_string(),
            out_dir.to_string_lossy().into_owned(),
            input.to_string_lossy().into_owned(),
        ];
        run_command(&self.bin, &args, self.timeout).await?;

        let root = out_dir.to_path_buf();
        let stems = tokio::task::spawn_blocking(move || StemFiles {
            instrumental: find_file(&root, INSTRUMENTAL_FILE),
            vocals: find_file(&root, VOCALS_FILE),
        })
        .await
        .map_err(|e| ToolError::Io(std::io::Error::other(e)))?;

        Ok(stems)
    }
}

/// Depth-first search for a file named `name` anywhere under `root`.
pub fn find_file(root: &Path, name: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => dirs.push(path),
            Ok(ft) if ft.is_file() && entry.file_name() == name => return Some(path),
            _ => {}
        }
    }
    dirs.sort();
    dirs.into_iter().find_map(|dir| find_file(&dir, name))
}
