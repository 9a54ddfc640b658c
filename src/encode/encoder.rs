use std::path::{Path, PathBuf};

use crate::{foundation::error::SlidecastResult, media::probe::NarrationInput};

/// One still-image clip to encode.
#[derive(Clone, Copy, Debug)]
pub struct SlideClipJob<'a> {
    /// 1-based slide index, used for error attribution.
    pub index: u32,
    /// Rendered slide image, held for every frame.
    pub image: &'a Path,
    /// Audio track.
    pub narration: &'a NarrationInput,
    /// Exact clip length in seconds.
    pub duration_sec: f64,
    /// Where the clip is written.
    pub out_path: &'a Path,
}

/// External media encoder used by the pipeline.
///
/// Calls are synchronous and never retried; a failure is final for the slide (or the join).
pub trait MediaEncoder {
    /// Check the encoder can run before any slide work starts.
    ///
    /// Failures are attributed to `first_index`.
    fn preflight(&mut self, first_index: u32) -> SlidecastResult<()> {
        let _ = first_index;
        Ok(())
    }

    /// Encode `job.image` held for `job.duration_sec` against the narration track.
    ///
    /// Errors are [`SlidecastError::Encode`](crate::SlidecastError::Encode) for `job.index`.
    fn encode_slide(&mut self, job: &SlideClipJob<'_>) -> SlidecastResult<()>;

    /// Join `clips` (video and audio), in the given order, into `out`.
    ///
    /// Errors are [`SlidecastError::Concatenation`](crate::SlidecastError::Concatenation); `out`
    /// is untouched on failure.
    fn concat(&mut self, clips: &[PathBuf], out: &Path) -> SlidecastResult<()>;
}
