use super::*;

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn value_after(args: &[String], flag: &str) -> String {
    let i = args.iter().position(|a| a == flag).unwrap();
    args[i + 1].clone()
}

#[test]
fn slide_args_loop_image_against_narration_file() {
    let narration = NarrationInput::File(PathBuf::from("voice/voiceover_2.mp3"));
    let job = SlideClipJob {
        index: 2,
        image: Path::new("work/slide_2.png"),
        narration: &narration,
        duration_sec: 7.25,
        out_path: Path::new("work/slide_2.mp4"),
    };
    let args = strings(&slide_clip_args(&job, ClipFormat::default()));

    assert_eq!(
        &args[..8],
        &["-y", "-loglevel", "error", "-loop", "1", "-framerate", "25", "-i"]
    );
    assert_eq!(args[8], "work/slide_2.png");
    assert_eq!(args[9], "-i");
    assert_eq!(args[10], "voice/voiceover_2.mp3");
    assert_eq!(value_after(&args, "-t"), "7.250");
    assert_eq!(value_after(&args, "-c:v"), "libx264");
    assert_eq!(value_after(&args, "-tune"), "stillimage");
    assert_eq!(value_after(&args, "-pix_fmt"), "yuv420p");
    assert_eq!(value_after(&args, "-c:a"), "aac");
    assert_eq!(value_after(&args, "-ar"), "44100");
    assert!(!args.iter().any(|a| a == "lavfi"));
    assert_eq!(args.last().unwrap(), "work/slide_2.mp4");
}

#[test]
fn slide_args_generate_silence_when_narration_missing() {
    let job = SlideClipJob {
        index: 3,
        image: Path::new("slide_3.png"),
        narration: &NarrationInput::Silence,
        duration_sec: 5.0,
        out_path: Path::new("slide_3.mp4"),
    };
    let args = strings(&slide_clip_args(
        &job,
        ClipFormat {
            fps: 30,
            sample_rate: 48_000,
        },
    ));

    assert_eq!(value_after(&args, "-framerate"), "30");
    assert_eq!(value_after(&args, "-f"), "lavfi");
    assert!(
        args.iter()
            .any(|a| a == "anullsrc=channel_layout=stereo:sample_rate=48000")
    );
    assert_eq!(value_after(&args, "-t"), "5.000");
    assert_eq!(value_after(&args, "-map"), "0:v:0");
}

#[test]
fn concat_filter_pairs_streams_in_order() {
    assert_eq!(concat_filter(1), "[0:v][0:a]concat=n=1:v=1:a=1[v][a]");
    assert_eq!(
        concat_filter(4),
        "[0:v][0:a][1:v][1:a][2:v][2:a][3:v][3:a]concat=n=4:v=1:a=1[v][a]"
    );
}

#[test]
fn concat_args_keep_clip_order() {
    let clips: Vec<PathBuf> = (1..=3)
        .map(|i| PathBuf::from(format!("work/slide_{i}.mp4")))
        .collect();
    let args = strings(&concat_args(
        &clips,
        Path::new("out/.tmp.mp4"),
        ClipFormat::default(),
    ));

    let inputs: Vec<&str> = args
        .windows(2)
        .filter(|w| w[0] == "-i")
        .map(|w| w[1].as_str())
        .collect();
    assert_eq!(
        inputs,
        vec!["work/slide_1.mp4", "work/slide_2.mp4", "work/slide_3.mp4"]
    );
    assert_eq!(value_after(&args, "-filter_complex"), concat_filter(3));
    assert_eq!(value_after(&args, "-pix_fmt"), "yuv420p");
    assert_eq!(value_after(&args, "-f"), "mp4");
    assert_eq!(args.last().unwrap(), "out/.tmp.mp4");
}

#[test]
fn missing_program_fails_preflight_for_first_slide() {
    let mut enc = FfmpegEncoder::new(
        "/nonexistent/slidecast-test/ffmpeg",
        ClipFormat::default(),
    );
    let err = enc.preflight(1).unwrap_err();
    assert_eq!(err.slide_index(), Some(1));
    assert!(matches!(err, SlidecastError::Encode { index: 1, .. }));
}

#[test]
fn spawn_failure_is_an_encode_error_for_the_slide() {
    let dir = tempfile::tempdir().unwrap();
    let mut enc = FfmpegEncoder::new(
        "/nonexistent/slidecast-test/ffmpeg",
        ClipFormat::default(),
    );
    let out = dir.path().join("slide_4.mp4");
    let err = enc
        .encode_slide(&SlideClipJob {
            index: 4,
            image: &dir.path().join("slide_4.png"),
            narration: &NarrationInput::Silence,
            duration_sec: 5.0,
            out_path: &out,
        })
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Encode { index: 4, .. }));
    assert!(!out.exists());
}

#[test]
fn failed_concat_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut enc = FfmpegEncoder::new(
        "/nonexistent/slidecast-test/ffmpeg",
        ClipFormat::default(),
    );
    let out = dir.path().join("final.mp4");

    let err = enc
        .concat(&[dir.path().join("slide_1.mp4")], &out)
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Concatenation(_)));
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    assert!(matches!(
        enc.concat(&[], &out),
        Err(SlidecastError::Concatenation(_))
    ));
}
