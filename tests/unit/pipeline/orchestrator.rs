use super::*;
use crate::{
    media::probe::NarrationInput,
    plan::{locate::AssetTable, model::SlideRole},
    text::font::FontSpec,
};

#[derive(Default)]
struct FakeEncoder {
    preflight_fails: bool,
    fail_at: Option<u32>,
    fail_concat: bool,
    encoded: Vec<(u32, f64, NarrationInput)>,
    joined: Vec<PathBuf>,
}

impl MediaEncoder for FakeEncoder {
    fn preflight(&mut self, first_index: u32) -> SlidecastResult<()> {
        if self.preflight_fails {
            return Err(SlidecastError::encode(first_index, "encoder missing"));
        }
        Ok(())
    }

    fn encode_slide(&mut self, job: &SlideClipJob<'_>) -> SlidecastResult<()> {
        assert!(job.image.is_file(), "image must be rendered before encoding");
        if self.fail_at == Some(job.index) {
            return Err(SlidecastError::encode(job.index, "exit status 1"));
        }
        std::fs::write(job.out_path, format!("clip {}", job.index)).unwrap();
        self.encoded
            .push((job.index, job.duration_sec, job.narration.clone()));
        Ok(())
    }

    fn concat(&mut self, clips: &[PathBuf], out: &Path) -> SlidecastResult<()> {
        if self.fail_concat {
            return Err(SlidecastError::concatenation("exit status 1"));
        }
        self.joined = clips.to_vec();
        std::fs::write(out, b"joined").unwrap();
        Ok(())
    }
}

/// Reads the duration straight out of the narration file.
struct TextDurationProbe;

impl DurationProbe for TextDurationProbe {
    fn duration_sec(&self, path: &Path) -> SlidecastResult<f64> {
        let text = std::fs::read_to_string(path).map_err(anyhow::Error::from)?;
        text.trim()
            .parse()
            .map_err(|_| SlidecastError::validation("not a duration"))
    }
}

fn config(work_dir: &Path) -> AssemblyConfig {
    let fonts = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    let mut cfg = AssemblyConfig {
        work_dir: work_dir.to_path_buf(),
        ..AssemblyConfig::default()
    };
    cfg.fonts.heading = FontSpec::file(fonts.join("DejaVuSans.ttf"));
    cfg.fonts.body = FontSpec::file(fonts.join("DejaVuSans-Bold.ttf"));
    cfg
}

fn unit(index: u32, role: SlideRole, narration: Option<PathBuf>) -> SlideUnit {
    SlideUnit {
        index,
        role,
        heading: format!("Slide {index}"),
        bullet_points: vec![format!("Point for slide {index}")],
        image_path: None,
        narration_path: narration,
        narration_text: None,
        image_prompt: None,
    }
}

fn three_slide_plan(dir: &Path) -> AssemblyPlan {
    let voice = |i: u32, secs: &str| {
        let p = dir.join(format!("voiceover_{i}.txt"));
        std::fs::write(&p, secs).unwrap();
        p
    };
    AssemblyPlan::new(
        "Ownership",
        vec![
            unit(1, SlideRole::Introduction, Some(voice(1, "3.5"))),
            unit(2, SlideRole::Section, Some(voice(2, "garbage"))),
            unit(3, SlideRole::Conclusion, None),
        ],
    )
    .unwrap()
}

#[test]
fn successful_run_reports_each_slide_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    let out = dir.path().join("final.mp4");
    let plan = three_slide_plan(dir.path());

    let mut p =
        Pipeline::with_parts(config(&work), FakeEncoder::default(), TextDurationProbe).unwrap();
    let report = p.run(&plan, &out).unwrap();

    assert_eq!(p.state(), &RunState::Done);
    assert_eq!(report.timeline(), vec![(1, 3.5), (2, 5.0), (3, 5.0)]);
    assert_eq!(report.total_duration_sec(), 13.5);
    assert_eq!(report.degraded().count(), 3, "no background images were supplied");
    assert!(!report.slides[0].narration_degraded);
    assert!(report.slides[1].narration_degraded);

    let enc = p.encoder();
    assert_eq!(enc.encoded[1].2, NarrationInput::Silence);
    assert_eq!(
        enc.joined,
        vec![
            work.join("slide_1.mp4"),
            work.join("slide_2.mp4"),
            work.join("slide_3.mp4"),
        ]
    );
    assert!(out.is_file());
    assert!(!work.exists(), "intermediates are removed after the run");
}

#[test]
fn keep_intermediates_leaves_images_and_clips() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("work");
    let mut cfg = config(&work);
    cfg.keep_intermediates = true;

    let mut p = Pipeline::with_parts(cfg, FakeEncoder::default(), TextDurationProbe).unwrap();
    p.run(&three_slide_plan(dir.path()), &dir.path().join("final.mp4"))
        .unwrap();

    for i in 1..=3 {
        assert!(work.join(format!("slide_{i}.png")).is_file());
        assert!(work.join(format!("slide_{i}.mp4")).is_file());
    }
}

#[test]
fn missing_encoder_aborts_before_any_slide() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("final.mp4");
    let encoder = FakeEncoder {
        preflight_fails: true,
        ..FakeEncoder::default()
    };

    let mut p =
        Pipeline::with_parts(config(&dir.path().join("work")), encoder, TextDurationProbe)
            .unwrap();
    let err = p.run(&three_slide_plan(dir.path()), &out).unwrap_err();

    assert!(matches!(err, SlidecastError::Encode { index: 1, .. }));
    assert!(matches!(
        p.state(),
        RunState::Aborted {
            stage: Stage::Encoding,
            index: Some(1),
            ..
        }
    ));
    assert!(p.encoder().encoded.is_empty());
    assert!(!out.exists());
}

#[test]
fn missing_ffprobe_aborts_instead_of_silencing_narration() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("final.mp4");
    let work = dir.path().join("work");
    let probe = FfprobeDurationProbe::new(dir.path().join("no-such-ffprobe"));

    let mut p = Pipeline::with_parts(config(&work), FakeEncoder::default(), probe).unwrap();
    let err = p.run(&three_slide_plan(dir.path()), &out).unwrap_err();

    assert!(matches!(err, SlidecastError::Encode { index: 1, .. }));
    assert!(matches!(
        p.state(),
        RunState::Aborted {
            stage: Stage::Encoding,
            index: Some(1),
            ..
        }
    ));
    assert!(p.encoder().encoded.is_empty());
    assert!(!out.exists());
    assert!(!work.exists());
}

#[test]
fn concat_failure_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("final.mp4");
    let work = dir.path().join("work");
    let encoder = FakeEncoder {
        fail_concat: true,
        ..FakeEncoder::default()
    };

    let mut p = Pipeline::with_parts(config(&work), encoder, TextDurationProbe).unwrap();
    let err = p.run(&three_slide_plan(dir.path()), &out).unwrap_err();

    assert!(matches!(err, SlidecastError::Concatenation(_)));
    assert!(matches!(
        p.state(),
        RunState::Aborted {
            stage: Stage::Concatenating,
            index: None,
            ..
        }
    ));
    assert!(!out.exists());
    assert!(!work.exists());
}

#[test]
fn unwritable_work_dir_is_a_render_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("work");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let mut p =
        Pipeline::with_parts(config(&blocker), FakeEncoder::default(), TextDurationProbe).unwrap();
    let err = p
        .run(&three_slide_plan(dir.path()), &dir.path().join("final.mp4"))
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Rendering));
    assert!(matches!(
        p.state(),
        RunState::Aborted {
            stage: Stage::Rendering,
            index: Some(1),
            ..
        }
    ));
    assert!(blocker.is_file());
}

#[test]
fn malformed_outline_aborts_while_resolving() {
    let dir = tempfile::tempdir().unwrap();
    let outline = Outline::from_json_str(r#"{ "title": "T", "sections": [] }"#).unwrap();

    let mut p = Pipeline::with_parts(
        config(&dir.path().join("work")),
        FakeEncoder::default(),
        TextDurationProbe,
    )
    .unwrap();
    let err = p
        .assemble(&outline, &AssetTable::new(), &dir.path().join("final.mp4"))
        .unwrap_err();

    assert!(matches!(err, SlidecastError::MalformedPlan(_)));
    assert!(matches!(
        p.state(),
        RunState::Aborted {
            stage: Stage::Resolving,
            index: None,
            ..
        }
    ));
    assert!(p.encoder().encoded.is_empty());
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.fps = 0;
    assert!(matches!(
        Pipeline::with_parts(cfg, FakeEncoder::default(), TextDurationProbe),
        Err(SlidecastError::Validation(_))
    ));

    let mut cfg = config(dir.path());
    cfg.fonts.body = FontSpec::file(dir.path().join("missing.ttf"));
    assert!(Pipeline::with_parts(cfg, FakeEncoder::default(), TextDurationProbe).is_err());
}

#[test]
fn pipeline_can_run_again_after_abort() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("final.mp4");
    let encoder = FakeEncoder {
        fail_at: Some(2),
        ..FakeEncoder::default()
    };
    let plan = three_slide_plan(dir.path());

    let mut p =
        Pipeline::with_parts(config(&dir.path().join("work")), encoder, TextDurationProbe)
            .unwrap();
    assert!(p.run(&plan, &out).is_err());
    assert!(p.state().is_terminal());

    p.encoder.fail_at = None;
    p.run(&plan, &out).unwrap();
    assert_eq!(p.state(), &RunState::Done);
}
