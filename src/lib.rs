//! Slidecast turns a lesson outline plus pre-generated images and narration into one narrated
//! slide video.
//!
//! The pipeline is strictly sequential:
//!
//! - Resolve an [`Outline`] into an [`AssemblyPlan`] (one [`SlideUnit`] per slide)
//! - For each slide, compose a slide image and encode a clip as long as its narration
//! - Concatenate the clips, in slide order, into the final video
//!
//! Missing background images and narration degrade gracefully; every other failure aborts the
//! run with the failing [`Stage`] and slide index (see [`RunState::Aborted`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Clip encoding and concatenation.
pub mod encode;
/// Narration duration probing.
pub mod media;
/// Run configuration and orchestration.
pub mod pipeline;
/// Outline parsing and plan resolution.
pub mod plan;
/// Slide image composition.
pub mod render;
/// Fonts, shaping and line wrapping.
pub mod text;

pub use crate::foundation::core::{Canvas, Point, Rect, Rgb8};
pub use crate::foundation::error::{AssetKind, SlidecastError, SlidecastResult, Stage};

pub use crate::encode::encoder::{MediaEncoder, SlideClipJob};
pub use crate::encode::ffmpeg::{ClipFormat, FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::media::probe::{
    DurationProbe, FALLBACK_NARRATION_SECS, FfprobeDurationProbe, NarrationInput,
};
pub use crate::pipeline::config::{AssemblyConfig, FontConfig};
pub use crate::pipeline::orchestrator::{AssemblyReport, Pipeline, SlideOutcome};
pub use crate::pipeline::state::RunState;
pub use crate::plan::locate::{AssetLocator, AssetTable, IndexedAssetLayout};
pub use crate::plan::model::{AssemblyPlan, SlideRole, SlideUnit};
pub use crate::plan::outline::Outline;
pub use crate::plan::resolve::resolve_plan;
pub use crate::render::slide::{BackgroundStatus, SlideImageComposer, SlideLayout};
pub use crate::text::font::{FontSource, FontSpec};
