use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    encode::encoder::{MediaEncoder, SlideClipJob},
    foundation::{
        error::{SlidecastError, SlidecastResult},
        fs::{ensure_parent_dir, parent_dir},
    },
    media::probe::NarrationInput,
};

/// Audio sample rate of every clip, including generated silence.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Whether an `ffmpeg` executable answers `-version` on PATH.
pub fn is_ffmpeg_on_path() -> bool {
    program_responds(Path::new("ffmpeg"))
}

/// Whether `program -version` runs and exits successfully.
pub fn program_responds(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Output settings shared by slide clips and the final join.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipFormat {
    /// Video frame rate.
    pub fps: u32,
    /// Audio sample rate.
    pub sample_rate: u32,
}

impl Default for ClipFormat {
    fn default() -> Self {
        Self {
            fps: 25,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Arguments that loop one image for `job.duration_sec` against one audio track.
///
/// Silence is generated with the `lavfi` `anullsrc` source so every clip carries an audio stream.
pub fn slide_clip_args(job: &SlideClipJob<'_>, format: ClipFormat) -> Vec<OsString> {
    let fps = format.fps.to_string();
    let rate = format.sample_rate.to_string();
    let duration = format!("{:.3}", job.duration_sec);

    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-loop", "1", "-framerate"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(fps.as_str().into());
    args.push("-i".into());
    args.push(job.image.into());

    match job.narration {
        NarrationInput::File(path) => {
            args.push("-i".into());
            args.push(path.into());
        }
        NarrationInput::Silence => {
            for a in ["-f", "lavfi", "-i"] {
                args.push(a.into());
            }
            args.push(format!("anullsrc=channel_layout=stereo:sample_rate={rate}").into());
        }
    }

    for a in [
        "-map",
        "0:v:0",
        "-map",
        "1:a:0",
        "-t",
        duration.as_str(),
        "-c:v",
        "libx264",
        "-tune",
        "stillimage",
        "-pix_fmt",
        "yuv420p",
        "-r",
        fps.as_str(),
        "-c:a",
        "aac",
        "-ar",
        rate.as_str(),
        "-ac",
        "2",
        "-movflags",
        "+faststart",
    ] {
        args.push(a.into());
    }
    args.push(job.out_path.into());
    args
}

/// `concat` filter graph joining `n` video+audio inputs in input order.
pub fn concat_filter(n: usize) -> String {
    let mut filter = String::new();
    for i in 0..n {
        filter.push_str(&format!("[{i}:v][{i}:a]"));
    }
    filter.push_str(&format!("concat=n={n}:v=1:a=1[v][a]"));
    filter
}

/// Arguments that re-encode `clips`, in order, into one stream at `out`.
pub fn concat_args(clips: &[PathBuf], out: &Path, format: ClipFormat) -> Vec<OsString> {
    let rate = format.sample_rate.to_string();
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect();
    for clip in clips {
        args.push("-i".into());
        args.push(clip.into());
    }
    args.push("-filter_complex".into());
    args.push(concat_filter(clips.len()).into());
    for a in [
        "-map",
        "[v]",
        "-map",
        "[a]",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-ar",
        rate.as_str(),
        "-movflags",
        "+faststart",
        "-f",
        "mp4",
    ] {
        args.push(a.into());
    }
    args.push(out.into());
    args
}

/// [`MediaEncoder`] that shells out to the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
    format: ClipFormat,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg", ClipFormat::default())
    }
}

impl FfmpegEncoder {
    /// Use `program` (a name on PATH or an explicit path).
    pub fn new(program: impl Into<PathBuf>, format: ClipFormat) -> Self {
        Self {
            program: program.into(),
            format,
        }
    }

    /// Program this encoder invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Output settings.
    pub fn format(&self) -> ClipFormat {
        self.format
    }

    fn run(&self, args: &[OsString]) -> Result<(), String> {
        tracing::debug!(program = %self.program.display(), ?args, "running ffmpeg");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.program.display()
                )
            })?;
        if !output.status.success() {
            return Err(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(())
    }
}

impl MediaEncoder for FfmpegEncoder {
    fn preflight(&mut self, first_index: u32) -> SlidecastResult<()> {
        if !program_responds(&self.program) {
            return Err(SlidecastError::encode(
                first_index,
                format!(
                    "'{}' is required for encoding, but could not be run",
                    self.program.display()
                ),
            ));
        }
        Ok(())
    }

    fn encode_slide(&mut self, job: &SlideClipJob<'_>) -> SlidecastResult<()> {
        if !job.duration_sec.is_finite() || job.duration_sec <= 0.0 {
            return Err(SlidecastError::encode(
                job.index,
                format!("clip duration must be finite and > 0, got {}", job.duration_sec),
            ));
        }
        ensure_parent_dir(job.out_path)
            .map_err(|e| SlidecastError::encode(job.index, e.to_string()))?;

        let args = slide_clip_args(job, self.format);
        self.run(&args)
            .map_err(|msg| SlidecastError::encode(job.index, msg))?;

        let written = std::fs::metadata(job.out_path)
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(SlidecastError::encode(
                job.index,
                format!("ffmpeg produced no output at '{}'", job.out_path.display()),
            ));
        }
        Ok(())
    }

    fn concat(&mut self, clips: &[PathBuf], out: &Path) -> SlidecastResult<()> {
        if clips.is_empty() {
            return Err(SlidecastError::concatenation("no clips to join"));
        }
        ensure_parent_dir(out).map_err(|e| SlidecastError::concatenation(e.to_string()))?;

        let dir = parent_dir(out);
        let tmp = tempfile::Builder::new()
            .prefix(".slidecast-")
            .suffix(".mp4")
            .tempfile_in(&dir)
            .with_context(|| format!("create temp file in '{}'", dir.display()))
            .map_err(|e| SlidecastError::concatenation(format!("{e:#}")))?
            .into_temp_path();

        let args = concat_args(clips, &tmp, self.format);
        self.run(&args).map_err(SlidecastError::concatenation)?;

        tmp.persist(out).map_err(|e| {
            SlidecastError::concatenation(format!(
                "failed to move output into '{}': {}",
                out.display(),
                e.error
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
