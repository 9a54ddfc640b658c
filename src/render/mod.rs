//! Slide raster composition.

/// Background image decoding and cover fitting.
pub mod fit;
/// Structured slide layout and the CPU slide composer.
pub mod slide;
