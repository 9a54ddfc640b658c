//! Outline parsing and resolution into an ordered slide plan.

/// Slide-position to raw-asset lookup.
pub mod locate;
/// Resolved plan types.
pub mod model;
/// Upstream outline documents.
pub mod outline;
/// Outline to plan resolution.
pub mod resolve;
