//! Interactive console menu.
//!
//! [`Menu`] drives the single-file and batch flows over any [`BufRead`] /
//! [`Write`] pair, so the binary hands it the terminal and tests hand it a
//! script. Bad answers are re-prompted or replaced by defaults; only I/O
//! failures and a failure to create the batch output directory escape.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use colored::Colorize;

use crate::{
    batch::{self, BatchObserver, BatchRunner, BatchSource},
    configuration::{
        self, BatchOptions, ConversionSettings, DEFAULT_FRAME_RATE, DEFAULT_OUTPUT_DIRECTORY, Preset,
        TargetSize,
    },
    error::VidgifError,
    job::{self, ConversionJob, ConversionOutcome},
    media::MediaFile,
    pipeline::Pipeline,
    progress::CancellationToken,
    validation,
};

const RULE: &str = "==================================================";
const SECTION_RULE: &str = "------------------------------";
const STEP_RULE: &str = "==============================";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";
const INTERRUPTED: &str = "Conversion interrupted by user";

/// Console behaviour switches.
#[derive(Debug, Clone)]
pub struct MenuOptions {
    /// Clear the terminal before each screen.
    pub clear_screen: bool,
    /// Print job settings and absolute paths.
    pub verbose: bool,
    /// Pause after an invalid main-menu choice.
    pub invalid_choice_delay: Duration,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            clear_screen: true,
            verbose: false,
            invalid_choice_delay: Duration::from_secs(1),
        }
    }
}

/// The interactive menu.
///
/// # Example
///
/// ```no_run
/// use std::io;
///
/// use vidgif::{FfmpegPipeline, Menu};
///
/// let pipeline = FfmpegPipeline::new();
/// let stdin = io::stdin();
/// Menu::new(stdin.lock(), io::stdout(), &pipeline).run()?;
/// # Ok::<(), vidgif::VidgifError>(())
/// ```
pub struct Menu<'a, R, W> {
    input: R,
    output: W,
    pipeline: &'a dyn Pipeline,
    options: MenuOptions,
    cancellation: Option<CancellationToken>,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    /// A menu reading answers from `input` and converting through `pipeline`.
    pub fn new(input: R, output: W, pipeline: &'a dyn Pipeline) -> Self {
        Self {
            input,
            output,
            pipeline,
            options: MenuOptions::default(),
            cancellation: None,
        }
    }

    /// Replace the console options.
    #[must_use]
    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    /// Share `token` with whatever interrupts conversions.
    ///
    /// The token is reset before each conversion starts. A batch stops before
    /// its next job once it is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Consume the menu and return its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Show the main menu until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Terminal I/O errors and batch output-directory creation errors.
    pub fn run(&mut self) -> Result<(), VidgifError> {
        match self.main_loop() {
            Err(VidgifError::InputClosed) => {
                log::debug!("Input closed, leaving the menu");
                Ok(())
            }
            other => other,
        }
    }

    fn main_loop(&mut self) -> Result<(), VidgifError> {
        loop {
            self.screen(None)?;
            writeln!(self.output, "{}", "MAIN MENU:".bold())?;
            writeln!(self.output, "1. Convert a single video")?;
            writeln!(self.output, "2. Convert multiple videos")?;
            writeln!(self.output, "3. Help and recommendations")?;
            writeln!(self.output, "4. Exit")?;
            writeln!(self.output)?;

            match self.prompt("Choose an action (1-4): ")?.as_str() {
                "1" => self.single_conversion()?,
                "2" => self.batch_conversion()?,
                "3" => self.help()?,
                "4" => {
                    writeln!(self.output, "\nGoodbye!")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "\n{}", "Invalid choice! Try again.".yellow())?;
                    self.output.flush()?;
                    thread::sleep(self.options.invalid_choice_delay);
                }
            }
        }
    }

    /// Convert one video chosen interactively.
    ///
    /// # Errors
    ///
    /// Terminal I/O errors, including [`VidgifError::InputClosed`].
    pub fn single_conversion(&mut self) -> Result<(), VidgifError> {
        self.screen(Some("MODE: Single video conversion"))?;

        let source = loop {
            let answer = self.prompt_path("Path to the video file (Ctrl+C to quit): ")?;
            match validation::validate_source(&answer) {
                Ok(()) => break answer,
                Err(VidgifError::SourceNotFound(_)) => {
                    writeln!(self.output, "{}", "File not found! Try again.".yellow())?;
                }
                Err(_) => {
                    writeln!(
                        self.output,
                        "{}",
                        "Supported formats: .mp4, .avi, .mov, .mkv, .webm".yellow()
                    )?;
                }
            }
        };

        let default_name = configuration::default_gif_name(&source);
        let answer = self.prompt(&format!(
            "Output file name [{}]: ",
            default_name.display()
        ))?;
        let destination = if answer.is_empty() {
            default_name
        } else {
            PathBuf::from(answer)
        };

        writeln!(self.output, "\nConversion settings:")?;
        writeln!(self.output, "1. Standard (FPS: 10, original size)")?;
        writeln!(self.output, "2. High quality (FPS: 15)")?;
        writeln!(self.output, "3. Custom settings")?;
        let settings = match self.prompt_or("Choose an option [1]: ", "1")?.as_str() {
            "2" => Preset::HighQuality.settings(),
            "3" => self.custom_settings()?,
            _ => Preset::Standard.settings(),
        };

        writeln!(self.output, "\n{STEP_RULE}")?;
        writeln!(self.output, "Starting conversion...")?;
        writeln!(self.output, "Converting: {}", file_name(&source))?;
        writeln!(self.output, "Output file: {}", file_name(&destination))?;
        if self.options.verbose {
            self.describe_source(&source)?;
            self.describe(&settings, &destination)?;
        }

        self.reset_cancellation();
        let outcome = job::convert(ConversionJob::new(&source, &destination, settings), self.pipeline);
        write_outcome(&mut self.output, &outcome)?;

        self.pause("\nPress Enter to return to the menu...")
    }

    fn custom_settings(&mut self) -> Result<ConversionSettings, VidgifError> {
        let answer = self.prompt_or(
            &format!("FPS (5-15 recommended) [{DEFAULT_FRAME_RATE}]: "),
            &DEFAULT_FRAME_RATE.to_string(),
        )?;
        let Some(frame_rate) = validation::parse_frame_rate(&answer) else {
            return self.fall_back_to_standard();
        };
        let mut settings = ConversionSettings::new().with_frame_rate(frame_rate);

        if self.confirm("Resize? (y/n) [n]: ")? {
            match self.prompt_size()? {
                Some(size) => settings = settings.with_target_size(size),
                None => return self.fall_back_to_standard(),
            }
        }
        Ok(settings)
    }

    fn fall_back_to_standard(&mut self) -> Result<ConversionSettings, VidgifError> {
        writeln!(
            self.output,
            "{}",
            "Invalid input, using standard settings".yellow()
        )?;
        Ok(Preset::Standard.settings())
    }

    /// Convert several videos with shared settings.
    ///
    /// # Errors
    ///
    /// Terminal I/O errors, including [`VidgifError::InputClosed`], and
    /// failure to create the output directory.
    pub fn batch_conversion(&mut self) -> Result<(), VidgifError> {
        self.screen(Some("MODE: Batch video conversion"))?;

        writeln!(self.output, "Choose a source:")?;
        writeln!(self.output, "1. Convert every video in a folder")?;
        writeln!(self.output, "2. Pick several files")?;
        let mode = self.prompt_or("Your choice [1]: ", "1")?;

        let candidates = match mode.as_str() {
            "1" => {
                let folder = self.prompt_path("Path to the folder (Ctrl+C to quit): ")?;
                if !folder.exists() {
                    writeln!(self.output, "{}", "Folder not found!".yellow())?;
                    return self.pause("\nPress Enter to go back...");
                }
                match batch::discover(&BatchSource::Directory(folder)) {
                    Ok(candidates) => candidates,
                    Err(error) => {
                        writeln!(self.output, "{}", format!("Cannot read folder: {error}").red())?;
                        return self.pause("\nPress Enter to go back...");
                    }
                }
            }
            "2" => {
                let files = self.prompt_file_list()?;
                batch::discover(&BatchSource::Files(files))?
            }
            _ => Vec::new(),
        };

        if candidates.is_empty() {
            writeln!(self.output, "{}", "No video files found to convert!".yellow())?;
            return self.pause("\nPress Enter to go back...");
        }

        writeln!(self.output, "\nFound {} video file(s)", candidates.len())?;
        writeln!(self.output, "\nSettings for all files:")?;
        let answer = self.prompt(&format!("FPS (default {DEFAULT_FRAME_RATE}): "))?;
        let frame_rate = validation::parse_frame_rate(&answer).unwrap_or(DEFAULT_FRAME_RATE);

        let mut settings = ConversionSettings::new().with_frame_rate(frame_rate);
        if self.confirm("Resize all GIFs? (y/n) [n]: ")? {
            match self.prompt_size()? {
                Some(size) => settings = settings.with_target_size(size),
                None => writeln!(self.output, "{}", "Invalid input, size unchanged".yellow())?,
            }
        }

        let output_directory = PathBuf::from(self.prompt_or(
            &format!("Output folder [{DEFAULT_OUTPUT_DIRECTORY}]: "),
            DEFAULT_OUTPUT_DIRECTORY,
        )?);
        let options = BatchOptions::new(&output_directory).with_settings(settings);

        writeln!(self.output, "\n{STEP_RULE}")?;
        writeln!(self.output, "Starting batch conversion...")?;
        if self.options.verbose {
            self.describe(&settings, &output_directory)?;
        }

        self.reset_cancellation();
        let pipeline = self.pipeline;
        let result = {
            let observer = ConsoleObserver {
                output: RefCell::new(&mut self.output),
            };
            let mut runner = BatchRunner::new(pipeline).with_observer(&observer);
            if let Some(token) = &self.cancellation {
                runner = runner.with_cancellation(token.clone());
            }
            runner.run_candidates(&candidates, &options)?
        };

        writeln!(self.output, "\n{STEP_RULE}")?;
        if result.interrupted {
            writeln!(
                self.output,
                "{}",
                format!(
                    "Batch interrupted by user, {} of {} file(s) skipped",
                    candidates.len() - result.total,
                    candidates.len()
                )
                .yellow()
            )?;
        }
        writeln!(
            self.output,
            "{}",
            format!("Done! Converted: {}/{}", result.succeeded, result.total).bold()
        )?;
        writeln!(
            self.output,
            "Files saved to: {}",
            absolute(&output_directory).display()
        )?;

        self.pause("\nPress Enter to return to the menu...")
    }

    fn prompt_file_list(&mut self) -> Result<Vec<PathBuf>, VidgifError> {
        writeln!(
            self.output,
            "\nEnter file paths (one per line, empty line to finish):"
        )?;
        let mut files = Vec::new();
        loop {
            let path = self.prompt_path(&format!("File {}: ", files.len() + 1))?;
            if path.as_os_str().is_empty() {
                return Ok(files);
            }
            if !path.exists() {
                writeln!(self.output, "{}", "File not found!".yellow())?;
                continue;
            }
            files.push(path);
        }
    }

    /// Show usage recommendations.
    ///
    /// # Errors
    ///
    /// Terminal I/O errors, including [`VidgifError::InputClosed`].
    pub fn help(&mut self) -> Result<(), VidgifError> {
        self.screen(Some("HELP"))?;
        writeln!(self.output, "\nRecommendations:")?;
        writeln!(self.output, "• FPS (frames per second):")?;
        writeln!(self.output, "  - 5-8: small files")?;
        writeln!(self.output, "  - 10-12: a good fit for most videos")?;
        writeln!(self.output, "  - 15+: high quality, large files")?;
        writeln!(self.output, "\n• Image size:")?;
        writeln!(self.output, "  - Common social media size: 480x270")?;
        writeln!(self.output, "  - Keep the original size to preserve quality")?;
        writeln!(self.output, "  - Smaller size = smaller file")?;
        writeln!(self.output, "\n• Supported video formats:")?;
        writeln!(self.output, "  MP4, AVI, MOV, MKV, WebM")?;
        writeln!(self.output, "\n• Requirements:")?;
        writeln!(self.output, "  - FFmpeg shared libraries installed")?;
        writeln!(self.output, "  - Enough free disk space")?;
        self.pause("\nPress Enter to return to the menu...")
    }

    fn reset_cancellation(&self) {
        if let Some(token) = &self.cancellation {
            token.reset();
        }
    }

    fn screen(&mut self, title: Option<&str>) -> Result<(), VidgifError> {
        if self.options.clear_screen {
            write!(self.output, "{CLEAR_SCREEN}")?;
        }
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output, "{}", "           VIDEO TO GIF CONVERTER".bold())?;
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output)?;
        if let Some(title) = title {
            writeln!(self.output, "{}", title.bold())?;
            writeln!(self.output, "{SECTION_RULE}")?;
        }
        Ok(())
    }

    fn describe(&mut self, settings: &ConversionSettings, target: &Path) -> Result<(), VidgifError> {
        let size = settings
            .target_size
            .map_or_else(|| "original size".to_string(), |size| size.to_string());
        writeln!(
            self.output,
            "{}",
            format!(
                "Settings: {} fps, {size} -> {}",
                settings.frame_rate,
                absolute(target).display()
            )
            .dimmed()
        )?;
        Ok(())
    }

    fn describe_source(&mut self, source: &Path) -> Result<(), VidgifError> {
        // Probing is informational; the conversion reports open failures.
        let Ok(media) = MediaFile::open(source) else {
            return Ok(());
        };
        let video = media.metadata();
        writeln!(
            self.output,
            "{}",
            format!(
                "Source: {}x{}, {:.2} fps, {:.1}s, {}",
                video.width,
                video.height,
                video.frames_per_second,
                video.duration.as_secs_f64(),
                video.codec,
            )
            .dimmed()
        )?;
        Ok(())
    }

    /// Print `message` and read one trimmed line.
    fn prompt(&mut self, message: &str) -> Result<String, VidgifError> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(VidgifError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    fn prompt_or(&mut self, message: &str, default: &str) -> Result<String, VidgifError> {
        let answer = self.prompt(message)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Read a path, dropping the quotes terminals add to dragged files.
    fn prompt_path(&mut self, message: &str) -> Result<PathBuf, VidgifError> {
        let answer = self.prompt(message)?;
        Ok(PathBuf::from(answer.trim_matches(|c| c == '"' || c == '\'')))
    }

    fn confirm(&mut self, message: &str) -> Result<bool, VidgifError> {
        Ok(self.prompt(message)?.eq_ignore_ascii_case("y"))
    }

    /// Ask for width and height; `None` if either answer is not a number.
    fn prompt_size(&mut self) -> Result<Option<TargetSize>, VidgifError> {
        let Some(width) = validation::parse_dimension(&self.prompt("Width (pixels): ")?) else {
            return Ok(None);
        };
        let Some(height) = validation::parse_dimension(&self.prompt("Height (pixels): ")?) else {
            return Ok(None);
        };
        Ok(Some(TargetSize::new(width, height)))
    }

    fn pause(&mut self, message: &str) -> Result<(), VidgifError> {
        self.prompt(message).map(|_| ())
    }
}

/// Prints one progress line per batch job.
struct ConsoleObserver<'w, W> {
    output: RefCell<&'w mut W>,
}

impl<W: Write> BatchObserver for ConsoleObserver<'_, W> {
    fn job_started(&self, index: usize, total: usize, job: &ConversionJob) {
        let mut output = self.output.borrow_mut();
        if let Err(error) = writeln!(
            output,
            "\n[{}/{total}] Converting: {}",
            index + 1,
            file_name(job.source_path())
        ) {
            log::warn!("Failed to print batch progress: {error}");
        }
    }

    fn job_finished(&self, _index: usize, _total: usize, outcome: &ConversionOutcome) {
        let mut output = self.output.borrow_mut();
        if let Err(error) = write_outcome(&mut **output, outcome) {
            log::warn!("Failed to print batch progress: {error}");
        }
    }
}

fn write_outcome<W: Write + ?Sized>(output: &mut W, outcome: &ConversionOutcome) -> Result<(), VidgifError> {
    if outcome.was_cancelled() {
        writeln!(output, "\n{}", INTERRUPTED.yellow())?;
        return Ok(());
    }

    let destination = file_name(outcome.job().destination_path());
    match (outcome.produced_bytes(), outcome.failure_reason()) {
        (Some(bytes), None) => {
            writeln!(output, "{}", format!("✓ Converted: {destination}").green())?;
            writeln!(output, "File size: {}", format_kilobytes(bytes))?;
        }
        (_, reason) => {
            let reason = reason.unwrap_or("unknown error");
            writeln!(output, "{}", format!("✗ Conversion failed: {reason}").red())?;
        }
    }
    Ok(())
}

/// `bytes` as kilobytes with two decimals, e.g. `"12.50 KB"`.
pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
