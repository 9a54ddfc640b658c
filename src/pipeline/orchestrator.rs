use std::path::{Path, PathBuf};

use crate::{
    encode::{
        encoder::{MediaEncoder, SlideClipJob},
        ffmpeg::FfmpegEncoder,
    },
    foundation::error::{SlidecastError, SlidecastResult, Stage},
    media::probe::{DurationProbe, FfprobeDurationProbe, measure_narration},
    pipeline::{config::AssemblyConfig, state::RunState, workspace::RunWorkspace},
    plan::{
        locate::AssetLocator,
        model::{AssemblyPlan, SlideRole, SlideUnit},
        outline::Outline,
        resolve::resolve_plan,
    },
    render::slide::{BackgroundStatus, SlideImageComposer},
};

/// How one slide went.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SlideOutcome {
    /// 1-based slide index.
    pub index: u32,
    /// Introduction, section or conclusion.
    pub role: SlideRole,
    /// Clip length in seconds.
    pub duration_sec: f64,
    /// Background image outcome.
    pub background: BackgroundStatus,
    /// True when the narration was replaced by fallback silence.
    pub narration_degraded: bool,
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AssemblyReport {
    /// Final video.
    pub output: PathBuf,
    /// One entry per slide, in video order.
    pub slides: Vec<SlideOutcome>,
}

impl AssemblyReport {
    /// `(index, duration)` per slide, in video order.
    pub fn timeline(&self) -> Vec<(u32, f64)> {
        self.slides
            .iter()
            .map(|s| (s.index, s.duration_sec))
            .collect()
    }

    /// Sum of all clip durations.
    pub fn total_duration_sec(&self) -> f64 {
        self.slides.iter().map(|s| s.duration_sec).sum()
    }

    /// Slides that used any fallback.
    pub fn degraded(&self) -> impl Iterator<Item = &SlideOutcome> {
        self.slides
            .iter()
            .filter(|s| s.narration_degraded || s.background.is_degraded())
    }
}

/// Sequential slide-to-video assembly.
///
/// Slides are rendered and encoded one at a time in index order; the first hard failure aborts
/// the run before any concatenation.
#[derive(Debug)]
pub struct Pipeline<E = FfmpegEncoder, P = FfprobeDurationProbe> {
    config: AssemblyConfig,
    composer: SlideImageComposer,
    encoder: E,
    probe: P,
    state: RunState,
}

impl Pipeline {
    /// Pipeline using the `ffmpeg`/`ffprobe` programs named in `config`.
    pub fn new(config: AssemblyConfig) -> SlidecastResult<Self> {
        let encoder = FfmpegEncoder::new(config.ffmpeg.clone(), config.clip_format());
        let probe = FfprobeDurationProbe::new(config.ffprobe.clone());
        Self::with_parts(config, encoder, probe)
    }
}

impl<E: MediaEncoder, P: DurationProbe> Pipeline<E, P> {
    /// Pipeline with a caller-supplied encoder and probe.
    ///
    /// Validates `config` and loads both fonts; nothing external is run yet.
    pub fn with_parts(config: AssemblyConfig, encoder: E, probe: P) -> SlidecastResult<Self> {
        config.validate()?;
        let heading_font = config.fonts.heading.load()?;
        let body_font = config.fonts.body.load()?;
        tracing::debug!(
            heading = heading_font.origin(),
            body = body_font.origin(),
            "fonts loaded"
        );
        let composer = SlideImageComposer::new(
            config.canvas,
            config.layout.clone(),
            &heading_font,
            &body_font,
        )?;
        Ok(Self {
            config,
            composer,
            encoder,
            probe,
            state: RunState::Idle,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// State after the most recent run (`Idle` before the first).
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Encoder in use.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Resolve `outline` with `locator`, then assemble the video at `out`.
    #[tracing::instrument(skip_all, fields(out = %out.display()))]
    pub fn assemble(
        &mut self,
        outline: &Outline,
        locator: &dyn AssetLocator,
        out: &Path,
    ) -> SlidecastResult<AssemblyReport> {
        self.state = RunState::Idle;
        self.state.advance(RunState::Resolving)?;
        let plan = match resolve_plan(outline, locator, &self.config.conclusion_heading) {
            Ok(plan) => plan,
            Err(e) => return Err(self.abort(e)),
        };
        tracing::info!(title = plan.title(), slides = plan.slide_count(), "plan resolved");
        self.execute(&plan, out)
    }

    /// Assemble an already resolved `plan` into the video at `out`.
    #[tracing::instrument(skip_all, fields(out = %out.display()))]
    pub fn run(&mut self, plan: &AssemblyPlan, out: &Path) -> SlidecastResult<AssemblyReport> {
        self.state = RunState::Idle;
        self.execute(plan, out)
    }

    /// Render only the image for `unit` to `out` (no encoding, no state change).
    pub fn render_slide(&mut self, unit: &SlideUnit, out: &Path) -> SlidecastResult<BackgroundStatus> {
        self.composer.render_to(unit, out)
    }

    fn execute(&mut self, plan: &AssemblyPlan, out: &Path) -> SlidecastResult<AssemblyReport> {
        let mut workspace = RunWorkspace::new(self.config.work_dir.clone());
        let result = self.execute_in(plan, out, &mut workspace);

        if self.config.keep_intermediates {
            tracing::info!(
                dir = %workspace.dir().display(),
                files = workspace.tracked().len(),
                "keeping intermediates"
            );
        } else if let Err(e) = workspace.cleanup() {
            tracing::warn!(error = %e, "failed to remove intermediates");
        }

        match result {
            Ok(report) => {
                tracing::info!(
                    output = %report.output.display(),
                    slides = report.slides.len(),
                    duration_sec = report.total_duration_sec(),
                    "video assembled"
                );
                Ok(report)
            }
            Err(e) => Err(self.abort(e)),
        }
    }

    fn execute_in(
        &mut self,
        plan: &AssemblyPlan,
        out: &Path,
        workspace: &mut RunWorkspace,
    ) -> SlidecastResult<AssemblyReport> {
        let first_index = plan.units().first().map(|u| u.index).unwrap_or(1);
        workspace
            .prepare()
            .map_err(|e| SlidecastError::render(first_index, e.to_string()))?;
        self.encoder.preflight(first_index)?;
        self.probe.preflight(first_index)?;

        let mut clips = Vec::with_capacity(plan.slide_count());
        let mut slides = Vec::with_capacity(plan.slide_count());

        for unit in plan.units() {
            let index = unit.index;

            self.state.advance(RunState::Rendering(index))?;
            let image = workspace.slide_image(index);
            workspace.track(image.clone());
            let background = self.composer.render_to(unit, &image)?;

            self.state.advance(RunState::Encoding(index))?;
            let narration = measure_narration(
                &self.probe,
                index,
                unit.narration_path.as_deref(),
                self.config.fallback_duration_sec,
            );
            let clip = workspace.slide_clip(index);
            workspace.track(clip.clone());
            self.encoder.encode_slide(&SlideClipJob {
                index,
                image: &image,
                narration: &narration.input,
                duration_sec: narration.duration_sec,
                out_path: &clip,
            })?;
            tracing::info!(
                index,
                duration_sec = narration.duration_sec,
                degraded = narration.degraded || background.is_degraded(),
                "slide encoded"
            );

            clips.push(clip);
            slides.push(SlideOutcome {
                index,
                role: unit.role,
                duration_sec: narration.duration_sec,
                background,
                narration_degraded: narration.degraded,
            });
        }

        self.state.advance(RunState::Concatenating)?;
        self.encoder.concat(&clips, out)?;
        self.state.advance(RunState::Done)?;

        Ok(AssemblyReport {
            output: out.to_path_buf(),
            slides,
        })
    }

    /// Record `err` as the terminal state and hand it back.
    fn abort(&mut self, err: SlidecastError) -> SlidecastError {
        let stage = err
            .stage()
            .or_else(|| self.state.stage())
            .unwrap_or(Stage::Resolving);
        let index = err.slide_index().or(match self.state {
            RunState::Rendering(i) | RunState::Encoding(i) => Some(i),
            _ => None,
        });
        tracing::error!(%stage, ?index, error = %err, "assembly aborted");
        self.state = RunState::Aborted {
            stage,
            index,
            cause: err.to_string(),
        };
        err
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
