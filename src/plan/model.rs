use std::path::PathBuf;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Presentation role of a slide within the outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideRole {
    /// Opening slide; its heading is the video title.
    Introduction,
    /// One topical section.
    Section,
    /// Closing slide.
    Conclusion,
}

/// One presentation unit with its heading, bullets and raw asset references.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SlideUnit {
    /// 1-based position in the final video.
    pub index: u32,
    /// Introduction, section or conclusion.
    pub role: SlideRole,
    /// Heading drawn at the top of the slide.
    pub heading: String,
    /// Bullet points, in display order.
    pub bullet_points: Vec<String>,
    /// Background raster for the right half, if one is expected.
    pub image_path: Option<PathBuf>,
    /// Narration audio, if one is expected.
    pub narration_path: Option<PathBuf>,
    /// Narration script the audio was synthesized from (diagnostics only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration_text: Option<String>,
    /// Prompt the background image was synthesized from (diagnostics only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

/// Resolved, immutable input for one assembly run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AssemblyPlan {
    title: String,
    units: Vec<SlideUnit>,
}

impl AssemblyPlan {
    /// Build a plan, checking the unit ordering invariants.
    ///
    /// Units must start with exactly one introduction, end with exactly one conclusion, contain
    /// only sections in between, and carry contiguous indices starting at 1.
    pub fn new(title: impl Into<String>, units: Vec<SlideUnit>) -> SlidecastResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SlidecastError::malformed_plan("plan title must be non-empty"));
        }
        if units.len() < 2 {
            return Err(SlidecastError::malformed_plan(
                "plan needs at least an introduction and a conclusion",
            ));
        }

        let last = units.len() - 1;
        for (pos, unit) in units.iter().enumerate() {
            let expected_index = u32::try_from(pos + 1)
                .map_err(|_| SlidecastError::malformed_plan("too many slides"))?;
            if unit.index != expected_index {
                return Err(SlidecastError::malformed_plan(format!(
                    "slide indices must be contiguous from 1: found {} at position {}",
                    unit.index,
                    pos + 1
                )));
            }
            let expected_role = match pos {
                0 => SlideRole::Introduction,
                p if p == last => SlideRole::Conclusion,
                _ => SlideRole::Section,
            };
            if unit.role != expected_role {
                return Err(SlidecastError::malformed_plan(format!(
                    "slide {} must be {:?}, found {:?}",
                    unit.index, expected_role, unit.role
                )));
            }
        }

        Ok(Self { title, units })
    }

    /// Video title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// All units in index order.
    pub fn units(&self) -> &[SlideUnit] {
        &self.units
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.units.len()
    }

    /// Lookup a unit by its 1-based index.
    pub fn unit(&self, index: u32) -> Option<&SlideUnit> {
        let pos = usize::try_from(index.checked_sub(1)?).ok()?;
        self.units.get(pos)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/model.rs"]
mod tests;
