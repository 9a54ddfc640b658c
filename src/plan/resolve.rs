use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::plan::locate::AssetLocator;
use crate::plan::model::{AssemblyPlan, SlideRole, SlideUnit};
use crate::plan::outline::{Outline, OutlineBlock};

/// Heading used for sections that arrive without one.
pub const DEFAULT_SECTION_HEADING: &str = "No heading";

/// Heading used for the closing slide unless configured otherwise.
pub const DEFAULT_CONCLUSION_HEADING: &str = "The End";

/// Resolve an outline into an ordered [`AssemblyPlan`].
///
/// The introduction is slide 1 and takes the title as its heading, sections follow as slides
/// `2..=N+1`, and the conclusion is slide `N+2`. Asset paths come from `locator`; their existence
/// is not checked here.
#[tracing::instrument(skip(outline, locator))]
pub fn resolve_plan(
    outline: &Outline,
    locator: &dyn AssetLocator,
    conclusion_heading: &str,
) -> SlidecastResult<AssemblyPlan> {
    let title = outline
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SlidecastError::malformed_plan("outline is missing a title"))?;

    let sections = match outline.sections.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => {
            return Err(SlidecastError::malformed_plan(
                "outline needs at least one section",
            ));
        }
    };

    let conclusion = outline
        .conclusion
        .as_ref()
        .ok_or_else(|| SlidecastError::malformed_plan("outline is missing the conclusion"))?;

    let empty_intro = OutlineBlock::default();
    let introduction = outline.introduction.as_ref().unwrap_or(&empty_intro);

    let mut units = Vec::with_capacity(sections.len() + 2);
    units.push(block_unit(
        1,
        SlideRole::Introduction,
        title,
        introduction,
        locator,
    ));

    for (offset, section) in sections.iter().enumerate() {
        let index = slide_index(offset + 2)?;
        let heading = section
            .heading
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_SECTION_HEADING);
        units.push(SlideUnit {
            index,
            role: SlideRole::Section,
            heading: heading.to_string(),
            bullet_points: section.slide_points.clone(),
            image_path: locator.background_image(SlideRole::Section, index),
            narration_path: locator.narration(SlideRole::Section, index),
            narration_text: section.voiceover.clone(),
            image_prompt: section.image_placeholder.clone(),
        });
    }

    let conclusion_index = slide_index(sections.len() + 2)?;
    units.push(block_unit(
        conclusion_index,
        SlideRole::Conclusion,
        conclusion_heading,
        conclusion,
        locator,
    ));

    let plan = AssemblyPlan::new(title, units)?;
    tracing::debug!(slides = plan.slide_count(), "resolved assembly plan");
    Ok(plan)
}

fn block_unit(
    index: u32,
    role: SlideRole,
    heading: &str,
    block: &OutlineBlock,
    locator: &dyn AssetLocator,
) -> SlideUnit {
    SlideUnit {
        index,
        role,
        heading: heading.to_string(),
        bullet_points: block.slide_points.clone(),
        image_path: locator.background_image(role, index),
        narration_path: locator.narration(role, index),
        narration_text: block.voiceover.clone(),
        image_prompt: block.image_placeholder.clone(),
    }
}

fn slide_index(position: usize) -> SlidecastResult<u32> {
    u32::try_from(position).map_err(|_| SlidecastError::malformed_plan("too many sections"))
}

#[cfg(test)]
#[path = "../../tests/unit/plan/resolve.rs"]
mod tests;
