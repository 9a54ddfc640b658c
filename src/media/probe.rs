use std::path::{Path, PathBuf};

use crate::{
    encode::ffmpeg::program_responds,
    foundation::error::{AssetKind, SlidecastError, SlidecastResult},
};

/// Duration assumed for a slide whose narration is missing or undecodable.
pub const FALLBACK_NARRATION_SECS: f64 = 5.0;

/// Measures the playback duration of an audio file.
pub trait DurationProbe {
    /// Check the probe can run before any slide work starts.
    ///
    /// Failures are hard errors attributed to `first_index`; they never degrade to silence.
    fn preflight(&self, first_index: u32) -> SlidecastResult<()> {
        let _ = first_index;
        Ok(())
    }

    /// Duration of `path` in seconds.
    fn duration_sec(&self, path: &Path) -> SlidecastResult<f64>;
}

/// [`DurationProbe`] backed by the `ffprobe` executable.
#[derive(Clone, Debug)]
pub struct FfprobeDurationProbe {
    program: PathBuf,
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeDurationProbe {
    /// Use `program` (a name on PATH or an explicit path).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program this probe invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn preflight(&self, first_index: u32) -> SlidecastResult<()> {
        if !program_responds(&self.program) {
            return Err(SlidecastError::encode(
                first_index,
                format!(
                    "'{}' is required to measure narration, but could not be run",
                    self.program.display()
                ),
            ));
        }
        Ok(())
    }

    fn duration_sec(&self, path: &Path) -> SlidecastResult<f64> {
        let out = std::process::Command::new(&self.program)
            .args(["-v", "error", "-select_streams", "a:0", "-show_entries"])
            .arg("stream=codec_type,duration:format=duration")
            .args(["-print_format", "json"])
            .arg(path)
            .output()
            .map_err(|e| {
                SlidecastError::validation(format!(
                    "failed to run '{}': {e}",
                    self.program.display()
                ))
            })?;
        if !out.status.success() {
            return Err(SlidecastError::validation(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        parse_ffprobe_duration(&out.stdout)
    }
}

/// Duration of the first audio stream in `ffprobe -select_streams a:0` JSON output.
///
/// The stream's own duration wins; containers that only report `format.duration` fall back to it.
/// Output without an audio stream is rejected, so a video-only file is not mistaken for narration.
pub fn parse_ffprobe_duration(stdout: &[u8]) -> SlidecastResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(stdout)
        .map_err(|e| SlidecastError::validation(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref().is_none_or(|t| t == "audio"))
        .ok_or_else(|| SlidecastError::validation("no audio stream"))?;

    match stream.duration.as_deref().map(parse_secs) {
        Some(Ok(secs)) => Ok(secs),
        _ => {
            let raw = parsed
                .format
                .and_then(|f| f.duration)
                .ok_or_else(|| SlidecastError::validation("ffprobe reported no duration"))?;
            parse_secs(&raw)
        }
    }
}

fn parse_secs(raw: &str) -> SlidecastResult<f64> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SlidecastError::validation(format!("invalid duration '{raw}'")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SlidecastError::validation(format!(
            "duration must be finite and > 0, got {secs}"
        )));
    }
    Ok(secs)
}

/// Audio source for a slide clip.
#[derive(Clone, Debug, PartialEq)]
pub enum NarrationInput {
    /// Usable narration file.
    File(PathBuf),
    /// Generated silence; the narration was missing or undecodable.
    Silence,
}

/// Measured narration for one slide.
#[derive(Clone, Debug, PartialEq)]
pub struct Narration {
    /// Audio to mux into the clip.
    pub input: NarrationInput,
    /// Clip duration in seconds.
    pub duration_sec: f64,
    /// True when `duration_sec` is the fallback.
    pub degraded: bool,
}

/// Probe the narration for slide `index`, degrading to `fallback_sec` of silence.
///
/// Never fails: a missing file, probe error or unusable duration is logged as an unavailable asset
/// and replaced by the fallback.
pub fn measure_narration(
    probe: &dyn DurationProbe,
    index: u32,
    path: Option<&Path>,
    fallback_sec: f64,
) -> Narration {
    let degrade = |path: &Path, reason: String| {
        let warning =
            SlidecastError::asset_unavailable(index, AssetKind::Narration, path, reason);
        tracing::warn!("{warning}; using {fallback_sec}s of silence");
        Narration {
            input: NarrationInput::Silence,
            duration_sec: fallback_sec,
            degraded: true,
        }
    };

    let Some(path) = path else {
        tracing::warn!(index, "no narration for slide; using {fallback_sec}s of silence");
        return Narration {
            input: NarrationInput::Silence,
            duration_sec: fallback_sec,
            degraded: true,
        };
    };
    if !path.is_file() {
        return degrade(path, "file not found".to_string());
    }

    match probe.duration_sec(path) {
        Ok(d) if d.is_finite() && d > 0.0 => {
            tracing::debug!(index, duration_sec = d, "narration measured");
            Narration {
                input: NarrationInput::File(path.to_path_buf()),
                duration_sec: d,
                degraded: false,
            }
        }
        Ok(d) => degrade(path, format!("unusable duration {d}")),
        Err(e) => degrade(path, e.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
