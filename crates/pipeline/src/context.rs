//! Per-run scratch directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Private working area for one pipeline run.
///
/// The directory and everything in it are removed when the context is
/// dropped, whichever way the run ends.
#[derive(Debug)]
pub struct PipelineContext {
    dir: TempDir,
}

impl PipelineContext {
    pub fn create() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("remix-").tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file (or subdirectory) inside the working area.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_removed_on_drop() {
        let ctx = PipelineContext::create().unwrap();
        let root = ctx.root().to_path_buf();
        std::fs::write(ctx.path("original.wav"), b"RIFF").unwrap();
        assert!(root.exists());
        drop(ctx);
        assert!(!root.exists());
    }

    #[test]
    fn contexts_are_distinct() {
        let a = PipelineContext::create().unwrap();
        let b = PipelineContext::create().unwrap();
        assert_ne!(a.root(), b.root());
    }
}
