use std::fs;
use std::path::Path;
use std::time::Duration;

use vidgif::{
    ConversionSettings, FfmpegLogLevel, Preset, TargetSize, VidgifError, VideoMetadata,
};

// ── Paths ────────────────────────────────────────────────────────

#[test]
fn accepted_extensions_ignore_case() {
    for name in ["a.mp4", "b.AVI", "c.Mov", "d.mkv", "e.WEBM", "dir/f.final.mp4", ".mp4", "dir/.MKV"] {
        assert!(vidgif::is_supported_video(name), "{name} should be accepted");
    }
    for name in ["a.txt", "b.gif", "mp4", "xmp4", "c.mp4.bak", ""] {
        assert!(!vidgif::is_supported_video(name), "{name} should be rejected");
    }
}

#[test]
fn validate_source_distinguishes_missing_and_unsupported() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let text = dir.path().join("notes.txt");
    let video = dir.path().join("clip.mkv");
    fs::write(&text, b"hello").unwrap();
    fs::write(&video, b"not checked here").unwrap();

    assert!(matches!(
        vidgif::validate_source(dir.path().join("missing.mp4")),
        Err(VidgifError::SourceNotFound(_))
    ));
    assert!(matches!(
        vidgif::validate_source(&text),
        Err(VidgifError::UnsupportedExtension(_))
    ));
    assert!(vidgif::validate_source(&video).is_ok());
}

#[test]
fn default_gif_name_keeps_dotted_stems() {
    assert_eq!(vidgif::default_gif_name("movie.mp4"), Path::new("movie.gif"));
    assert_eq!(
        vidgif::default_gif_name("/videos/trip.day1.webm"),
        Path::new("trip.day1.gif")
    );
    assert_eq!(vidgif::default_gif_name(""), Path::new("output.gif"));
}

// ── Settings ─────────────────────────────────────────────────────

#[test]
fn presets_match_menu_descriptions() {
    let standard = Preset::Standard.settings();
    assert_eq!(standard.frame_rate, vidgif::DEFAULT_FRAME_RATE);
    assert_eq!(standard.target_size, None);

    let high = Preset::HighQuality.settings();
    assert_eq!(high.frame_rate, vidgif::HIGH_QUALITY_FRAME_RATE);
    assert_eq!(high.target_size, None);
    assert_eq!(ConversionSettings::default(), standard);
}

#[test]
fn settings_validation() {
    assert!(vidgif::validate_settings(&ConversionSettings::new()).is_ok());
    assert!(vidgif::validate_settings(&ConversionSettings::new().with_frame_rate(60)).is_ok());

    assert!(matches!(
        vidgif::validate_settings(&ConversionSettings::new().with_frame_rate(0)),
        Err(VidgifError::InvalidFrameRate(0))
    ));
    assert!(matches!(
        vidgif::validate_settings(&ConversionSettings::new().with_target_size(TargetSize::new(0, 10))),
        Err(VidgifError::InvalidDimensions { width: 0, height: 10 })
    ));
    assert!(matches!(
        vidgif::validate_settings(
            &ConversionSettings::new().with_target_size(TargetSize::new(70_000, 10))
        ),
        Err(VidgifError::InvalidDimensions { .. })
    ));
}

#[test]
fn with_resolution_sets_and_clears_size() {
    let sized = ConversionSettings::new().with_resolution(Some((480, 270).into()));
    assert_eq!(sized.target_size, Some(TargetSize::new(480, 270)));
    assert_eq!(sized.with_resolution(None).target_size, None);
    assert_eq!(TargetSize::new(480, 270).to_string(), "480x270");
}

// ── Console answers ──────────────────────────────────────────────

#[test]
fn numeric_answers_must_be_positive_digits() {
    assert_eq!(vidgif::parse_frame_rate("15"), Some(15));
    assert_eq!(vidgif::parse_frame_rate("  8\n"), Some(8));
    for bad in ["", "0", "-5", "+5", "1.5", "ten", "99999999999"] {
        assert_eq!(vidgif::parse_frame_rate(bad), None, "{bad:?} should be rejected");
    }
    assert_eq!(vidgif::parse_dimension("480"), Some(480));
    assert_eq!(vidgif::parse_dimension("480px"), None);
}

#[test]
fn kilobytes_have_two_decimals() {
    assert_eq!(vidgif::format_kilobytes(0), "0.00 KB");
    assert_eq!(vidgif::format_kilobytes(1536), "1.50 KB");
    assert_eq!(vidgif::format_kilobytes(12_800), "12.50 KB");
}

#[test]
fn ffmpeg_log_levels_parse() {
    assert_eq!("Error".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Error));
    assert_eq!("warn".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Warning));
    assert!("chatty".parse::<FfmpegLogLevel>().is_err());
    assert_eq!(FfmpegLogLevel::default(), FfmpegLogLevel::Error);
}

// ── Metadata ─────────────────────────────────────────────────────

fn metadata(duration: Duration) -> VideoMetadata {
    VideoMetadata {
        width: 320,
        height: 240,
        frames_per_second: 30.0,
        duration,
        codec: "h264".to_string(),
        format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
    }
}

#[test]
fn expected_frames_round_up() {
    assert_eq!(metadata(Duration::from_millis(2_050)).expected_gif_frames(10), Some(21));
    assert_eq!(metadata(Duration::from_secs(2)).expected_gif_frames(15), Some(30));
    assert_eq!(metadata(Duration::ZERO).expected_gif_frames(10), None);
    assert_eq!(metadata(Duration::from_secs(2)).expected_gif_frames(0), None);
}

#[test]
fn media_file_rejects_non_media() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("fake.mp4");
    fs::write(&path, b"plain text pretending to be a video").unwrap();

    let result = vidgif::MediaFile::open(&path);
    assert!(matches!(
        result,
        Err(VidgifError::FileOpen { .. } | VidgifError::NoVideoStream)
    ));
}

#[test]
fn media_file_reads_fixture_metadata() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }
    let media = vidgif::MediaFile::open(path).expect("Failed to open fixture");
    let video = media.metadata();

    assert_eq!((video.width, video.height), (320, 240));
    assert!((video.frames_per_second - 30.0).abs() < 0.5);
    assert!(video.duration >= Duration::from_millis(1_900));
    assert_eq!(video.codec, "h264");
    assert_eq!(media.path(), Path::new(path));
}
