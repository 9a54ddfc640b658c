use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::{error::SlidecastResult, fs::remove_if_exists};

/// Per-run directory of intermediate artifacts, named by slide index.
#[derive(Clone, Debug)]
pub struct RunWorkspace {
    dir: PathBuf,
    created_dir: bool,
    written: Vec<PathBuf>,
}

impl RunWorkspace {
    /// Workspace rooted at `dir`; nothing is created until [`Self::prepare`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            created_dir: false,
            written: Vec::new(),
        }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed.
    pub fn prepare(&mut self) -> SlidecastResult<()> {
        if !self.dir.is_dir() {
            std::fs::create_dir_all(&self.dir)
                .with_context(|| format!("create work dir '{}'", self.dir.display()))?;
            self.created_dir = true;
        }
        Ok(())
    }

    /// `slide_<index>.png`.
    pub fn slide_image(&self, index: u32) -> PathBuf {
        self.dir.join(format!("slide_{index}.png"))
    }

    /// `slide_<index>.mp4`.
    pub fn slide_clip(&self, index: u32) -> PathBuf {
        self.dir.join(format!("slide_{index}.mp4"))
    }

    /// Remember `path` for [`Self::cleanup`].
    pub fn track(&mut self, path: PathBuf) {
        if !self.written.contains(&path) {
            self.written.push(path);
        }
    }

    /// Paths tracked so far.
    pub fn tracked(&self) -> &[PathBuf] {
        &self.written
    }

    /// Delete tracked intermediates, and the directory itself if this workspace created it and
    /// it is now empty.
    pub fn cleanup(&mut self) -> SlidecastResult<()> {
        for path in self.written.drain(..) {
            remove_if_exists(&path)?;
        }
        if self.created_dir {
            let empty = std::fs::read_dir(&self.dir)
                .map(|mut d| d.next().is_none())
                .unwrap_or(false);
            if empty {
                std::fs::remove_dir(&self.dir)
                    .with_context(|| format!("remove work dir '{}'", self.dir.display()))?;
                self.created_dir = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/workspace.rs"]
mod tests;
