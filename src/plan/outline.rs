use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Introduction or conclusion block of an outline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutlineBlock {
    /// Narration script.
    #[serde(default)]
    pub voiceover: Option<String>,
    /// Bullet points shown on the slide.
    #[serde(default)]
    pub slide_points: Vec<String>,
    /// Background image prompt.
    #[serde(default)]
    pub image_placeholder: Option<String>,
}

/// One topical section of an outline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutlineSection {
    /// Section heading.
    #[serde(default)]
    pub heading: Option<String>,
    /// Narration script.
    #[serde(default)]
    pub voiceover: Option<String>,
    /// Bullet points shown on the slide.
    #[serde(default)]
    pub slide_points: Vec<String>,
    /// Background image prompt.
    #[serde(default)]
    pub image_placeholder: Option<String>,
}

/// Structured topic breakdown produced upstream of the assembly pipeline.
///
/// Every field is optional at the serde level so that structural problems surface as
/// [`SlidecastError::MalformedPlan`] from the resolver rather than as opaque parse errors.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Outline {
    /// Video title.
    #[serde(default)]
    pub title: Option<String>,
    /// Opening block.
    #[serde(default)]
    pub introduction: Option<OutlineBlock>,
    /// Topical sections, in order.
    #[serde(default)]
    pub sections: Option<Vec<OutlineSection>>,
    /// Closing block.
    #[serde(default)]
    pub conclusion: Option<OutlineBlock>,
}

/// Persisted assembly record written by the request layer (`assembly.json`).
#[derive(serde::Deserialize)]
struct AssemblyRecord {
    slides: AssemblySlides,
    #[serde(default)]
    conclusion: Option<AssemblyConclusion>,
}

#[derive(serde::Deserialize)]
struct AssemblySlides {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    introduction: Option<Vec<String>>,
    #[serde(default)]
    sections: Option<Vec<AssemblySection>>,
}

#[derive(serde::Deserialize)]
struct AssemblySection {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    slide_points: Vec<String>,
}

#[derive(serde::Deserialize)]
struct AssemblyConclusion {
    #[serde(default)]
    slide_points: Vec<String>,
}

impl From<AssemblyRecord> for Outline {
    fn from(rec: AssemblyRecord) -> Self {
        Self {
            title: rec.slides.title,
            introduction: rec.slides.introduction.map(|points| OutlineBlock {
                slide_points: points,
                ..OutlineBlock::default()
            }),
            sections: rec.slides.sections.map(|sections| {
                sections
                    .into_iter()
                    .map(|s| OutlineSection {
                        heading: s.heading,
                        slide_points: s.slide_points,
                        ..OutlineSection::default()
                    })
                    .collect()
            }),
            conclusion: rec.conclusion.map(|c| OutlineBlock {
                slide_points: c.slide_points,
                ..OutlineBlock::default()
            }),
        }
    }
}

impl Outline {
    /// Parse either the outline record or the persisted assembly record.
    pub fn from_json_str(json: &str) -> SlidecastResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| SlidecastError::malformed_plan(format!("invalid outline JSON: {e}")))?;
        Self::from_json_value(value)
    }

    /// Parse an outline from an already decoded JSON value.
    pub fn from_json_value(value: serde_json::Value) -> SlidecastResult<Self> {
        if !value.is_object() {
            return Err(SlidecastError::malformed_plan(
                "outline JSON must be an object",
            ));
        }

        if value.get("slides").is_some() {
            let rec: AssemblyRecord = serde_json::from_value(value).map_err(|e| {
                SlidecastError::malformed_plan(format!("invalid assembly record: {e}"))
            })?;
            return Ok(rec.into());
        }

        serde_json::from_value(value)
            .map_err(|e| SlidecastError::malformed_plan(format!("invalid outline: {e}")))
    }

    /// Read and parse an outline file.
    pub fn from_json_file(path: &Path) -> SlidecastResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read outline '{}'", path.display()))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/outline.rs"]
mod tests;
