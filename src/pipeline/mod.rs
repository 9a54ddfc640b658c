//! Run configuration, state machine and the sequential orchestrator.

/// Serializable run configuration.
pub mod config;
/// Slide-by-slide driver.
pub mod orchestrator;
/// Run state machine.
pub mod state;
/// Per-run intermediate files.
pub mod workspace;
