use crate::foundation::error::{SlidecastError, SlidecastResult, Stage};

/// Progress of one assembly run.
///
/// Runs move `Resolving → Rendering(1) → Encoding(1) → Rendering(2) → ... → Concatenating → Done`;
/// any non-terminal state may move to `Aborted`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing has run yet.
    #[default]
    Idle,
    /// Building the plan from the outline.
    Resolving,
    /// Composing the image for a slide.
    Rendering(u32),
    /// Encoding the clip for a slide.
    Encoding(u32),
    /// Joining clips into the final video.
    Concatenating,
    /// Final video written.
    Done,
    /// Run stopped at `stage` (and slide `index`, when the stage is per slide).
    Aborted {
        /// Stage that failed.
        stage: Stage,
        /// Failing slide, if any.
        index: Option<u32>,
        /// Error message.
        cause: String,
    },
}

impl RunState {
    /// `Done` or `Aborted`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted { .. })
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: &RunState) -> bool {
        use RunState::*;

        if matches!(next, Aborted { .. }) {
            return !self.is_terminal();
        }
        match (self, next) {
            (Idle, Resolving) | (Idle, Rendering(1)) | (Resolving, Rendering(1)) => true,
            (Rendering(i), Encoding(j)) => i == j,
            (Encoding(i), Rendering(j)) => i.checked_add(1) == Some(*j),
            (Encoding(_), Concatenating) => true,
            (Concatenating, Done) => true,
            _ => false,
        }
    }

    /// Move to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: RunState) -> SlidecastResult<()> {
        if !self.can_advance_to(&next) {
            return Err(SlidecastError::validation(format!(
                "illegal run state transition {self} -> {next}"
            )));
        }
        tracing::debug!(from = %self, to = %next, "run state");
        *self = next;
        Ok(())
    }

    /// Stage the run was in, for attributing a failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Resolving => Some(Stage::Resolving),
            Self::Rendering(_) => Some(Stage::Rendering),
            Self::Encoding(_) => Some(Stage::Encoding),
            Self::Concatenating => Some(Stage::Concatenating),
            Self::Aborted { stage, .. } => Some(*stage),
            Self::Idle | Self::Done => None,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Resolving => f.write_str("resolving"),
            Self::Rendering(i) => write!(f, "rendering({i})"),
            Self::Encoding(i) => write!(f, "encoding({i})"),
            Self::Concatenating => f.write_str("concatenating"),
            Self::Done => f.write_str("done"),
            Self::Aborted {
                stage,
                index: Some(i),
                ..
            } => write!(f, "aborted({stage}, {i})"),
            Self::Aborted { stage, .. } => write!(f, "aborted({stage})"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
