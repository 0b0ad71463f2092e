//! Scripted console sessions.
//!
//! Each test feeds a canned sequence of answers to [`Menu`] and inspects
//! what it printed and which jobs reached the pipeline.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use vidgif::{
    CancellationToken, ConversionJob, Menu, MenuOptions, Pipeline, TargetSize, VidgifError,
};

/// Records every job and writes 2 KiB, or fails for names containing "bad".
#[derive(Default)]
struct RecordingPipeline {
    jobs: RefCell<Vec<ConversionJob>>,
}

impl RecordingPipeline {
    fn jobs(&self) -> Vec<ConversionJob> {
        self.jobs.borrow().clone()
    }
}

impl Pipeline for RecordingPipeline {
    fn convert(&self, job: &ConversionJob) -> Result<(), VidgifError> {
        self.jobs.borrow_mut().push(job.clone());
        let name = job.source_path().file_name().unwrap_or_default().to_string_lossy();
        if name.contains("bad") {
            return Err(VidgifError::VideoDecodeError("broken packet".to_string()));
        }
        fs::write(job.destination_path(), vec![0u8; 2048])?;
        Ok(())
    }
}

fn run_menu(script: &str, pipeline: &RecordingPipeline) -> String {
    let options = MenuOptions {
        clear_screen: false,
        verbose: false,
        invalid_choice_delay: Duration::ZERO,
    };
    let mut menu = Menu::new(script.as_bytes(), Vec::new(), pipeline).with_options(options);
    menu.run().expect("Menu session failed");
    String::from_utf8(menu.into_output()).expect("Menu output is not UTF-8")
}

fn touch(directory: &Path, name: &str) -> PathBuf {
    let path = directory.join(name);
    fs::write(&path, b"video bytes").expect("Failed to write file");
    path
}

fn line(path: &Path) -> String {
    format!("{}\n", path.display())
}

// ── Main menu ────────────────────────────────────────────────────

#[test]
fn exit_says_goodbye() {
    let output = run_menu("4\n", &RecordingPipeline::default());
    assert!(output.contains("MAIN MENU:"));
    assert!(output.contains("Choose an action (1-4): "));
    assert!(output.contains("Goodbye!"));
}

#[test]
fn closed_input_ends_the_session() {
    let pipeline = RecordingPipeline::default();
    let output = run_menu("", &pipeline);
    assert!(output.contains("MAIN MENU:"));
    assert!(!output.contains("Goodbye!"));
    assert!(pipeline.jobs().is_empty());
}

#[test]
fn invalid_choice_returns_to_the_menu() {
    let output = run_menu("9\nabc\n4\n", &RecordingPipeline::default());
    assert_eq!(output.matches("Invalid choice! Try again.").count(), 2);
    assert_eq!(output.matches("MAIN MENU:").count(), 3);
    assert!(output.contains("Goodbye!"));
}

#[test]
fn help_lists_recommendations() {
    let output = run_menu("3\n\n4\n", &RecordingPipeline::default());
    assert!(output.contains("HELP"));
    assert!(output.contains("Recommendations:"));
    assert!(output.contains("480x270"));
    assert!(output.contains("Press Enter to return to the menu..."));
}

// ── Single conversion ────────────────────────────────────────────

#[test]
fn single_conversion_reprompts_until_path_is_usable() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let notes = touch(dir.path(), "notes.txt");
    let clip = touch(dir.path(), "clip.mp4");
    let destination = dir.path().join("result.gif");

    let script = format!(
        "1\n{}{}\"{}\"\n{}1\n\n4\n",
        line(&dir.path().join("missing.mp4")),
        line(&notes),
        clip.display(),
        line(&destination),
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("File not found! Try again."));
    assert!(output.contains("Supported formats: .mp4, .avi, .mov, .mkv, .webm"));
    assert!(output.contains("Output file name [clip.gif]: "));
    assert!(output.contains("✓ Converted: result.gif"));
    assert!(output.contains("File size: 2.00 KB"));

    let jobs = pipeline.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].source_path(), clip);
    assert_eq!(jobs[0].destination_path(), destination);
    assert_eq!(jobs[0].frame_rate(), 10);
    assert_eq!(jobs[0].target_size(), None);
}

#[test]
fn high_quality_preset_uses_fifteen_fps() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "clip.webm");
    let script = format!(
        "1\n{}{}2\n\n4\n",
        line(&clip),
        line(&dir.path().join("hq.gif"))
    );
    let pipeline = RecordingPipeline::default();
    run_menu(&script, &pipeline);

    assert_eq!(pipeline.jobs()[0].frame_rate(), 15);
    assert_eq!(pipeline.jobs()[0].target_size(), None);
}

#[test]
fn custom_settings_with_resize() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "clip.mov");
    let script = format!(
        "1\n{}{}3\n12\ny\n480\n270\n\n4\n",
        line(&clip),
        line(&dir.path().join("custom.gif"))
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("FPS (5-15 recommended) [10]: "));
    assert!(output.contains("Width (pixels): "));
    let jobs = pipeline.jobs();
    let job = &jobs[0];
    assert_eq!(job.frame_rate(), 12);
    assert_eq!(job.target_size(), Some(TargetSize::new(480, 270)));
}

#[test]
fn invalid_custom_frame_rate_falls_back_to_standard() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "clip.avi");
    let script = format!(
        "1\n{}{}3\nfast\n\n4\n",
        line(&clip),
        line(&dir.path().join("fallback.gif"))
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("Invalid input, using standard settings"));
    assert_eq!(pipeline.jobs()[0].frame_rate(), 10);
    assert_eq!(pipeline.jobs()[0].target_size(), None);
}

#[test]
fn invalid_custom_size_falls_back_to_standard() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "clip.mkv");
    let script = format!(
        "1\n{}{}3\n8\ny\nwide\n\n4\n",
        line(&clip),
        line(&dir.path().join("fallback.gif"))
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("Invalid input, using standard settings"));
    assert_eq!(pipeline.jobs()[0].frame_rate(), 10);
}

#[test]
fn failed_single_conversion_reports_reason() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "bad_clip.mp4");
    let script = format!("1\n{}{}\n\n4\n", line(&clip), line(&dir.path().join("x.gif")));
    let output = run_menu(&script, &RecordingPipeline::default());

    assert!(output.contains("✗ Conversion failed: Failed to decode video frame: broken packet"));
    assert!(output.contains("Goodbye!"));
}

#[test]
fn input_closing_mid_flow_is_not_an_error() {
    let output = run_menu("1\n", &RecordingPipeline::default());
    assert!(output.contains("MODE: Single video conversion"));
}

// ── Batch conversion ─────────────────────────────────────────────

#[test]
fn batch_over_a_folder_reports_progress_and_summary() {
    let source = tempfile::tempdir().expect("Failed to create temp dir");
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    touch(source.path(), "good.mp4");
    touch(source.path(), "bad.mkv");
    touch(source.path(), "readme.txt");
    let output_directory = scratch.path().join("gifs");

    let script = format!(
        "2\n1\n{}8\nn\n{}\n4\n",
        line(source.path()),
        line(&output_directory)
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("MODE: Batch video conversion"));
    assert!(output.contains("Found 2 video file(s)"));
    assert!(output.contains("[1/2] Converting: "));
    assert!(output.contains("[2/2] Converting: "));
    assert!(output.contains("✓ Converted: good.gif"));
    assert!(output.contains("✗ Conversion failed: Failed to decode video frame: broken packet"));
    assert!(output.contains("Done! Converted: 1/2"));
    assert!(output.contains("Files saved to: "));

    assert!(output_directory.join("good.gif").is_file());
    assert!(pipeline.jobs().iter().all(|job| job.frame_rate() == 8));
}

#[test]
fn batch_over_picked_files_skips_missing_entries() {
    let source = tempfile::tempdir().expect("Failed to create temp dir");
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    let first = touch(source.path(), "first.mp4");
    let second = touch(source.path(), "second.mov");
    let output_directory = scratch.path().join("out");

    let script = format!(
        "2\n2\n{}{}{}\n\ny\n320\n180\n{}\n4\n",
        line(&first),
        line(&source.path().join("ghost.mp4")),
        line(&second),
        line(&output_directory),
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("File 1: "));
    assert!(output.contains("File not found!"));
    assert!(output.contains("Found 2 video file(s)"));
    assert!(output.contains("Done! Converted: 2/2"));

    let jobs = pipeline.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].source_path(), first);
    assert_eq!(jobs[1].source_path(), second);
    assert!(jobs.iter().all(|job| job.frame_rate() == 10));
    assert!(jobs
        .iter()
        .all(|job| job.target_size() == Some(TargetSize::new(320, 180))));
    assert_eq!(jobs[1].destination_path(), output_directory.join("second.gif"));
}

#[test]
fn batch_with_invalid_size_keeps_original_size() {
    let source = tempfile::tempdir().expect("Failed to create temp dir");
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    touch(source.path(), "clip.mp4");

    let script = format!(
        "2\n1\n{}0\ny\n320\nhigh\n{}\n4\n",
        line(source.path()),
        line(&scratch.path().join("out"))
    );
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("Invalid input, size unchanged"));
    let jobs = pipeline.jobs();
    assert_eq!(jobs[0].frame_rate(), 10);
    assert_eq!(jobs[0].target_size(), None);
}

#[test]
fn batch_with_missing_folder_goes_back() {
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    let script = format!("2\n1\n{}\n4\n", line(&scratch.path().join("nowhere")));
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("Folder not found!"));
    assert!(output.contains("Press Enter to go back..."));
    assert!(output.contains("Goodbye!"));
    assert!(pipeline.jobs().is_empty());
}

#[test]
fn batch_without_videos_goes_back() {
    let source = tempfile::tempdir().expect("Failed to create temp dir");
    touch(source.path(), "notes.txt");
    let script = format!("2\n1\n{}\n4\n", line(source.path()));
    let pipeline = RecordingPipeline::default();
    let output = run_menu(&script, &pipeline);

    assert!(output.contains("No video files found to convert!"));
    assert!(pipeline.jobs().is_empty());
}

#[test]
fn batch_with_empty_file_list_goes_back() {
    let output = run_menu("2\n2\n\n\n4\n", &RecordingPipeline::default());
    assert!(output.contains("No video files found to convert!"));
    assert!(output.contains("Goodbye!"));
}

#[test]
fn verbose_mode_prints_settings() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "clip.mp4");
    let script = format!("1\n{}{}\n\n4\n", line(&clip), line(&dir.path().join("v.gif")));
    let pipeline = RecordingPipeline::default();
    let options = MenuOptions {
        clear_screen: false,
        verbose: true,
        invalid_choice_delay: Duration::ZERO,
    };

    let mut menu = Menu::new(script.as_bytes(), Vec::new(), &pipeline).with_options(options);
    menu.run().expect("Menu session failed");
    let output = String::from_utf8(menu.into_output()).expect("Menu output is not UTF-8");

    assert!(output.contains("Settings: 10 fps, original size -> "));
    assert!(output.contains("v.gif"));
    // Not a real video, so no source line.
    assert!(!output.contains("Source: "));
}

// ── Interruption ─────────────────────────────────────────────────

/// Cancels the shared token and reports a cancellation for names
/// containing "stop"; converts everything else.
struct InterruptedPipeline {
    token: CancellationToken,
    jobs: RefCell<Vec<ConversionJob>>,
}

impl InterruptedPipeline {
    fn new(token: CancellationToken) -> Self {
        Self {
            token,
            jobs: RefCell::new(Vec::new()),
        }
    }
}

impl Pipeline for InterruptedPipeline {
    fn convert(&self, job: &ConversionJob) -> Result<(), VidgifError> {
        self.jobs.borrow_mut().push(job.clone());
        let name = job.source_path().file_name().unwrap_or_default().to_string_lossy();
        if name.contains("stop") {
            self.token.cancel();
            return Err(VidgifError::Cancelled);
        }
        fs::write(job.destination_path(), b"GIF89a")?;
        Ok(())
    }
}

fn run_interruptible(script: &str, pipeline: &InterruptedPipeline) -> String {
    let options = MenuOptions {
        clear_screen: false,
        verbose: false,
        invalid_choice_delay: Duration::ZERO,
    };
    let mut menu = Menu::new(script.as_bytes(), Vec::new(), pipeline)
        .with_options(options)
        .with_cancellation(pipeline.token.clone());
    menu.run().expect("Menu session failed");
    String::from_utf8(menu.into_output()).expect("Menu output is not UTF-8")
}

#[test]
fn interrupted_single_conversion_returns_to_menu() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "stop_here.mp4");
    let script = format!("1\n{}{}\n\n4\n", line(&clip), line(&dir.path().join("s.gif")));

    let pipeline = InterruptedPipeline::new(CancellationToken::new());
    let output = run_interruptible(&script, &pipeline);

    assert!(output.contains("Conversion interrupted by user"));
    assert!(!output.contains("✗ Conversion failed"));
    assert_eq!(output.matches("MAIN MENU:").count(), 2);
    assert!(output.contains("Goodbye!"));
}

#[test]
fn token_is_reset_before_the_next_conversion() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clip = touch(dir.path(), "clip.mp4");
    let token = CancellationToken::new();
    token.cancel();

    let script = format!(
        "2\n2\n{}\n\nn\n{}\n4\n",
        line(&clip),
        line(&dir.path().join("out"))
    );
    let pipeline = InterruptedPipeline::new(token);
    let output = run_interruptible(&script, &pipeline);

    assert!(output.contains("Done! Converted: 1/1"));
    assert!(!output.contains("Batch interrupted by user"));
}

#[test]
fn interrupted_batch_skips_remaining_files() {
    let source = tempfile::tempdir().expect("Failed to create temp dir");
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    let first = touch(source.path(), "first.mp4");
    let stop = touch(source.path(), "stop.mp4");
    let last = touch(source.path(), "last.mp4");

    let script = format!(
        "2\n2\n{}{}{}\n\nn\n{}\n4\n",
        line(&first),
        line(&stop),
        line(&last),
        line(&scratch.path().join("out")),
    );
    let pipeline = InterruptedPipeline::new(CancellationToken::new());
    let output = run_interruptible(&script, &pipeline);

    assert!(output.contains("Conversion interrupted by user"));
    assert!(output.contains("Batch interrupted by user, 1 of 3 file(s) skipped"));
    assert!(output.contains("Done! Converted: 1/2"));
    assert!(!output.contains("[3/3] Converting: "));
    assert_eq!(pipeline.jobs.borrow().len(), 2);
}
