use std::cell::Cell;

use super::*;

struct FixedProbe {
    result: Result<f64, &'static str>,
    calls: Cell<u32>,
}

impl FixedProbe {
    fn ok(d: f64) -> Self {
        Self {
            result: Ok(d),
            calls: Cell::new(0),
        }
    }

    fn err(msg: &'static str) -> Self {
        Self {
            result: Err(msg),
            calls: Cell::new(0),
        }
    }
}

impl DurationProbe for FixedProbe {
    fn duration_sec(&self, _path: &Path) -> SlidecastResult<f64> {
        self.calls.set(self.calls.get() + 1);
        self.result.map_err(SlidecastError::validation)
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"ID3").unwrap();
    p
}

#[test]
fn parses_audio_stream_duration() {
    let out = br#"{
      "programs": [],
      "streams": [ { "codec_type": "audio", "duration": "12.345000" } ],
      "format": { "duration": "12.400000" }
    }"#;
    assert_eq!(parse_ffprobe_duration(out).unwrap(), 12.345);
}

#[test]
fn falls_back_to_container_duration() {
    let out = br#"{
      "streams": [ { "codec_type": "audio", "duration": "N/A" } ],
      "format": { "duration": "3.500000" }
    }"#;
    assert_eq!(parse_ffprobe_duration(out).unwrap(), 3.5);

    let out = br#"{ "streams": [ { "codec_type": "audio" } ], "format": { "duration": "2.0" } }"#;
    assert_eq!(parse_ffprobe_duration(out).unwrap(), 2.0);
}

#[test]
fn video_only_file_is_not_narration() {
    // `-select_streams a:0` yields no streams for a file without audio.
    let out = br#"{ "programs": [], "streams": [], "format": { "duration": "8.000000" } }"#;
    let err = parse_ffprobe_duration(out).unwrap_err();
    assert!(err.to_string().contains("no audio stream"));

    let out = br#"{ "format": { "duration": "8.000000" } }"#;
    assert!(parse_ffprobe_duration(out).is_err());
}

#[test]
fn rejects_missing_or_bad_duration() {
    let audio = |stream: &str, format: &str| {
        format!(r#"{{ "streams": [ {{ "codec_type": "audio"{stream} }} ], "format": {{ {format} }} }}"#)
    };
    assert!(parse_ffprobe_duration(audio("", "").as_bytes()).is_err());
    assert!(parse_ffprobe_duration(audio(r#", "duration": "N/A""#, r#""duration": "N/A""#).as_bytes()).is_err());
    assert!(parse_ffprobe_duration(audio(r#", "duration": "0.000""#, r#""duration": "0.000""#).as_bytes()).is_err());
    assert!(parse_ffprobe_duration(b"{}").is_err());
    assert!(parse_ffprobe_duration(b"not json").is_err());
}

#[test]
fn measured_narration_uses_probe() {
    let dir = tempfile::tempdir().unwrap();
    let path = touch(dir.path(), "voiceover_1.mp3");
    let probe = FixedProbe::ok(7.25);

    let n = measure_narration(&probe, 1, Some(&path), FALLBACK_NARRATION_SECS);
    assert_eq!(n.duration_sec, 7.25);
    assert!(!n.degraded);
    assert_eq!(n.input, NarrationInput::File(path));
    assert_eq!(probe.calls.get(), 1);
}

#[test]
fn missing_file_falls_back_without_probing() {
    let dir = tempfile::tempdir().unwrap();
    let probe = FixedProbe::ok(7.25);

    let n = measure_narration(
        &probe,
        2,
        Some(&dir.path().join("voiceover_2.mp3")),
        FALLBACK_NARRATION_SECS,
    );
    assert_eq!(n.duration_sec, 5.0);
    assert!(n.degraded);
    assert_eq!(n.input, NarrationInput::Silence);
    assert_eq!(probe.calls.get(), 0);

    let n = measure_narration(&probe, 2, None, 3.0);
    assert_eq!(n.duration_sec, 3.0);
    assert_eq!(n.input, NarrationInput::Silence);
}

#[test]
fn undecodable_file_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = touch(dir.path(), "voiceover_3.mp3");

    let n = measure_narration(
        &FixedProbe::err("invalid data"),
        3,
        Some(&path),
        FALLBACK_NARRATION_SECS,
    );
    assert_eq!(n.duration_sec, FALLBACK_NARRATION_SECS);
    assert!(n.degraded);

    let n = measure_narration(&FixedProbe::ok(f64::NAN), 3, Some(&path), 5.0);
    assert!(n.degraded);
    assert_eq!(n.input, NarrationInput::Silence);
}

#[test]
fn unrunnable_ffprobe_fails_preflight() {
    let dir = tempfile::tempdir().unwrap();
    let probe = FfprobeDurationProbe::new(dir.path().join("no-such-ffprobe"));

    let err = probe.preflight(4).unwrap_err();
    assert!(matches!(err, SlidecastError::Encode { index: 4, .. }));
    assert!(err.to_string().contains("no-such-ffprobe"));
}

#[test]
fn default_preflight_accepts_any_probe() {
    assert!(FixedProbe::ok(1.0).preflight(1).is_ok());
}
