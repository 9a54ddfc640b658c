//! Clip encoding and concatenation.

/// Encoder seam used by the pipeline.
pub mod encoder;
/// `ffmpeg` subprocess implementation.
pub mod ffmpeg;
