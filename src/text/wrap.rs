use crate::foundation::error::SlidecastResult;
use crate::text::engine::TextLayoutEngine;

/// Rendered width of a candidate line.
pub trait TextMeasure {
    /// Width of `text` in pixels.
    fn measure(&mut self, text: &str) -> SlidecastResult<f32>;
}

/// [`TextLayoutEngine`] measurement at a fixed font size.
#[derive(Debug)]
pub struct SizedMeasure<'e> {
    engine: &'e mut TextLayoutEngine,
    size_px: f32,
}

impl<'e> SizedMeasure<'e> {
    /// Measure with `engine` at `size_px`.
    pub fn new(engine: &'e mut TextLayoutEngine, size_px: f32) -> Self {
        Self { engine, size_px }
    }
}

impl TextMeasure for SizedMeasure<'_> {
    fn measure(&mut self, text: &str) -> SlidecastResult<f32> {
        self.engine.measure_width(text, self.size_px)
    }
}

/// Greedy word wrap against `max_width`.
///
/// Words are appended to the current line while the measured candidate fits. A word that does not
/// fit closes the current line, even when it is still empty, and starts the next one, so a single
/// word wider than the budget sits alone on its own line and an oversized first word is preceded
/// by a blank line. The last line is always emitted, which makes empty input produce one empty
/// line. Callers treat blank lines as "no content".
pub fn wrap_words<'w, M>(
    words: impl IntoIterator<Item = &'w str>,
    measure: &mut M,
    max_width: f32,
) -> SlidecastResult<Vec<String>>
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in words {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure.measure(&candidate)? <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    lines.push(current);
    Ok(lines)
}

/// Split `text` on whitespace and wrap it with [`wrap_words`].
pub fn wrap_text<M>(text: &str, measure: &mut M, max_width: f32) -> SlidecastResult<Vec<String>>
where
    M: TextMeasure + ?Sized,
{
    wrap_words(text.split_whitespace(), measure, max_width)
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
