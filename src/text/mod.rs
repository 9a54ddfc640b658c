//! Font loading, text shaping and greedy line wrapping.

/// Parley-backed shaping and measurement.
pub mod engine;
/// Font file and system font resolution.
pub mod font;
/// Greedy word wrap.
pub mod wrap;
