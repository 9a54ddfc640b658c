use std::path::PathBuf;

/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Pipeline stage an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Stage {
    /// Turning the outline into an [`AssemblyPlan`](crate::AssemblyPlan).
    Resolving,
    /// Composing a slide image.
    Rendering,
    /// Encoding a single slide clip.
    Encoding,
    /// Joining all slide clips into the final video.
    Concatenating,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Rendering => "rendering",
            Self::Encoding => "encoding",
            Self::Concatenating => "concatenating",
        };
        f.write_str(name)
    }
}

/// Raw asset kinds that may be absent without failing a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AssetKind {
    /// Background raster for the right half of a slide.
    BackgroundImage,
    /// Narration audio for a slide.
    Narration,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackgroundImage => f.write_str("background image"),
            Self::Narration => f.write_str("narration"),
        }
    }
}

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// The outline is structurally unusable; no slide work is attempted.
    #[error("malformed plan: {0}")]
    MalformedPlan(String),

    /// An optional raw asset is missing or unreadable. Logged, never returned from a run.
    #[error("asset unavailable for slide {index}: {asset} '{}': {reason}", .path.display())]
    AssetUnavailable {
        /// 1-based slide index.
        index: u32,
        /// Which asset is missing.
        asset: AssetKind,
        /// Path that was looked up.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// Slide image composition failed.
    #[error("render failure at slide {index}: {message}")]
    Render {
        /// 1-based slide index.
        index: u32,
        /// Failure detail.
        message: String,
    },

    /// The external encoder failed for one slide clip.
    #[error("encode failure at slide {index}: {message}")]
    Encode {
        /// 1-based slide index.
        index: u32,
        /// Failure detail (includes encoder stderr when available).
        message: String,
    },

    /// Joining clips into the final video failed.
    #[error("concatenation failure: {0}")]
    Concatenation(String),

    /// Invalid configuration or caller-provided values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    /// Build a [`SlidecastError::MalformedPlan`] value.
    pub fn malformed_plan(msg: impl Into<String>) -> Self {
        Self::MalformedPlan(msg.into())
    }

    /// Build a [`SlidecastError::AssetUnavailable`] value.
    pub fn asset_unavailable(
        index: u32,
        asset: AssetKind,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::AssetUnavailable {
            index,
            asset,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`SlidecastError::Render`] value.
    pub fn render(index: u32, msg: impl Into<String>) -> Self {
        Self::Render {
            index,
            message: msg.into(),
        }
    }

    /// Build a [`SlidecastError::Encode`] value.
    pub fn encode(index: u32, msg: impl Into<String>) -> Self {
        Self::Encode {
            index,
            message: msg.into(),
        }
    }

    /// Build a [`SlidecastError::Concatenation`] value.
    pub fn concatenation(msg: impl Into<String>) -> Self {
        Self::Concatenation(msg.into())
    }

    /// Build a [`SlidecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stage this error is attributed to, if it belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::MalformedPlan(_) => Some(Stage::Resolving),
            Self::Render { .. } => Some(Stage::Rendering),
            Self::Encode { .. } => Some(Stage::Encoding),
            Self::Concatenation(_) => Some(Stage::Concatenating),
            Self::AssetUnavailable { .. } | Self::Validation(_) | Self::Other(_) => None,
        }
    }

    /// Slide index this error is attributed to, if any.
    pub fn slide_index(&self) -> Option<u32> {
        match self {
            Self::AssetUnavailable { index, .. }
            | Self::Render { index, .. }
            | Self::Encode { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
