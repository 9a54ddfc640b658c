use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Families tried, in order, before the generic sans-serif fallback.
const PREFERRED_SANS_FAMILIES: &[&str] = &[
    "Arial",
    "Helvetica",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
];

/// How to pick the font for one text role.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// Explicit TTF/OTF file. When absent the system font database is searched.
    pub path: Option<PathBuf>,
    /// Prefer a bold face during system lookup.
    pub bold: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            path: None,
            bold: true,
        }
    }
}

impl FontSpec {
    /// Spec pointing at an explicit font file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            bold: true,
        }
    }

    /// Load the font this spec describes.
    pub fn load(&self) -> SlidecastResult<FontSource> {
        match &self.path {
            Some(path) => FontSource::from_file(path),
            None => FontSource::system_sans(self.bold),
        }
    }
}

/// Raw font bytes plus the face index inside them.
#[derive(Clone)]
pub struct FontSource {
    bytes: Arc<Vec<u8>>,
    index: u32,
    origin: String,
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSource")
            .field("origin", &self.origin)
            .field("index", &self.index)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl FontSource {
    /// Wrap in-memory font bytes (face 0).
    pub fn from_bytes(bytes: Vec<u8>, origin: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index: 0,
            origin: origin.into(),
        }
    }

    /// Read a font file from disk.
    pub fn from_file(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::validation(format!("read font '{}': {e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(SlidecastError::validation(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self::from_bytes(bytes, path.display().to_string()))
    }

    /// Find a sans-serif face in the system font database.
    pub fn system_sans(bold: bool) -> SlidecastResult<Self> {
        use usvg::fontdb;

        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut families: Vec<fontdb::Family<'_>> = PREFERRED_SANS_FAMILIES
            .iter()
            .map(|name| fontdb::Family::Name(*name))
            .collect();
        families.push(fontdb::Family::SansSerif);

        let query = fontdb::Query {
            families: &families,
            weight: if bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };

        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| SlidecastError::validation("no system fonts available"))?;

        let origin = db
            .face(id)
            .map(|face| format!("system:{}", face.post_script_name))
            .unwrap_or_else(|| "system".to_string());
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| SlidecastError::validation("failed to load system font data"))?;

        Ok(Self {
            bytes: Arc::new(bytes),
            index,
            origin,
        })
    }

    /// Font bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Face index within [`Self::bytes`].
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Where the font came from (file path or system face name).
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
