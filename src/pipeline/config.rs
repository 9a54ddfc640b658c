use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    encode::ffmpeg::{ClipFormat, DEFAULT_SAMPLE_RATE},
    foundation::{
        core::Canvas,
        error::{SlidecastError, SlidecastResult},
    },
    media::probe::FALLBACK_NARRATION_SECS,
    plan::resolve::DEFAULT_CONCLUSION_HEADING,
    render::slide::SlideLayout,
    text::font::FontSpec,
};

/// Font selection per text role.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Heading font (regular weight by default).
    pub heading: FontSpec,
    /// Bullet font (bold by default).
    pub body: FontSpec,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            heading: FontSpec {
                path: None,
                bold: false,
            },
            body: FontSpec::default(),
        }
    }
}

/// Everything an assembly run needs besides the outline and the assets.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Output raster and video size.
    pub canvas: Canvas,
    /// Video frame rate.
    pub fps: u32,
    /// Audio sample rate of every clip.
    pub sample_rate: u32,
    /// Clip length used when narration is missing or undecodable.
    pub fallback_duration_sec: f64,
    /// Heading and body fonts.
    pub fonts: FontConfig,
    /// Slide geometry and colors.
    pub layout: SlideLayout,
    /// Heading of the closing slide.
    pub conclusion_heading: String,
    /// `ffmpeg` program.
    pub ffmpeg: PathBuf,
    /// `ffprobe` program.
    pub ffprobe: PathBuf,
    /// Directory for per-slide intermediates.
    pub work_dir: PathBuf,
    /// Keep slide images and clips after the run.
    pub keep_intermediates: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: 25,
            sample_rate: DEFAULT_SAMPLE_RATE,
            fallback_duration_sec: FALLBACK_NARRATION_SECS,
            fonts: FontConfig::default(),
            layout: SlideLayout::default(),
            conclusion_heading: DEFAULT_CONCLUSION_HEADING.to_string(),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            work_dir: PathBuf::from("output"),
            keep_intermediates: false,
        }
    }
}

impl AssemblyConfig {
    /// Load a JSON config; absent fields take their defaults.
    pub fn from_json_file(path: &Path) -> SlidecastResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| SlidecastError::validation(format!("config '{}': {e}", path.display())))?;
        Ok(cfg)
    }

    /// Reject values no run could succeed with.
    pub fn validate(&self) -> SlidecastResult<()> {
        self.canvas.validate()?;
        if self.fps == 0 {
            return Err(SlidecastError::validation("fps must be non-zero"));
        }
        if self.sample_rate == 0 {
            return Err(SlidecastError::validation("sample_rate must be non-zero"));
        }
        if !self.fallback_duration_sec.is_finite() || self.fallback_duration_sec <= 0.0 {
            return Err(SlidecastError::validation(
                "fallback_duration_sec must be finite and > 0",
            ));
        }
        if self.conclusion_heading.trim().is_empty() {
            return Err(SlidecastError::validation(
                "conclusion_heading must be non-empty",
            ));
        }
        self.layout.validate(self.canvas)
    }

    /// Clip encoding settings.
    pub fn clip_format(&self) -> ClipFormat {
        ClipFormat {
            fps: self.fps,
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
