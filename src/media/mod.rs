//! Narration measurement.

/// Audio duration probing with silent fallback.
pub mod probe;
