use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::plan::model::SlideRole;

/// Maps a slide position to the raw assets produced for it upstream.
///
/// Lookups never touch the filesystem; a returned path may not exist. Consumers decide how to
/// degrade when it does not.
pub trait AssetLocator {
    /// Background raster for slide `index`.
    fn background_image(&self, role: SlideRole, index: u32) -> Option<PathBuf>;

    /// Narration audio for slide `index`.
    fn narration(&self, role: SlideRole, index: u32) -> Option<PathBuf>;
}

/// `image_<index>.<ext>` / `voiceover_<index>.<ext>` naming over two directories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedAssetLayout {
    /// Directory holding background images.
    pub image_dir: PathBuf,
    /// Directory holding narration files.
    pub narration_dir: PathBuf,
    /// Background image extension, without the dot.
    pub image_ext: String,
    /// Narration extension, without the dot.
    pub narration_ext: String,
}

impl IndexedAssetLayout {
    /// Layout with the default `png`/`mp3` extensions.
    pub fn new(image_dir: impl Into<PathBuf>, narration_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            narration_dir: narration_dir.into(),
            image_ext: "png".to_string(),
            narration_ext: "mp3".to_string(),
        }
    }

    /// Layout with `images/` and `voiceovers/` under a single root.
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("images"), root.join("voiceovers"))
    }

    /// Override the background image extension.
    pub fn with_image_ext(mut self, ext: impl Into<String>) -> Self {
        self.image_ext = ext.into();
        self
    }

    /// Override the narration extension.
    pub fn with_narration_ext(mut self, ext: impl Into<String>) -> Self {
        self.narration_ext = ext.into();
        self
    }
}

impl AssetLocator for IndexedAssetLayout {
    fn background_image(&self, _role: SlideRole, index: u32) -> Option<PathBuf> {
        Some(
            self.image_dir
                .join(format!("image_{index}.{}", self.image_ext)),
        )
    }

    fn narration(&self, _role: SlideRole, index: u32) -> Option<PathBuf> {
        Some(
            self.narration_dir
                .join(format!("voiceover_{index}.{}", self.narration_ext)),
        )
    }
}

/// Explicit per-index asset table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetTable {
    images: BTreeMap<u32, PathBuf>,
    narrations: BTreeMap<u32, PathBuf>,
}

impl AssetTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a background image for slide `index`.
    pub fn insert_image(&mut self, index: u32, path: impl Into<PathBuf>) -> &mut Self {
        self.images.insert(index, path.into());
        self
    }

    /// Register a narration file for slide `index`.
    pub fn insert_narration(&mut self, index: u32, path: impl Into<PathBuf>) -> &mut Self {
        self.narrations.insert(index, path.into());
        self
    }
}

impl AssetLocator for AssetTable {
    fn background_image(&self, _role: SlideRole, index: u32) -> Option<PathBuf> {
        self.images.get(&index).cloned()
    }

    fn narration(&self, _role: SlideRole, index: u32) -> Option<PathBuf> {
        self.narrations.get(&index).cloned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/locate.rs"]
mod tests;
