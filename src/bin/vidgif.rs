use std::{
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use vidgif::{
    CancellationToken, ConversionJob, FfmpegLogLevel, FfmpegPipeline, Menu, MenuOptions,
    OperationType, Pipeline, ProgressCallback, ProgressInfo, VidgifError,
};

const CLI_AFTER_HELP: &str = "The converter is menu driven: run it without arguments and follow the prompts.\nCtrl+C stops a running conversion; at a prompt it quits.\n\nExamples:\n  vidgif\n  vidgif --verbose --log-level warning\n  vidgif --no-clear";

#[derive(Debug, Parser)]
#[command(
    name = "vidgif",
    version,
    about = "Convert videos to animated GIFs from an interactive menu",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Show conversion settings and absolute output paths.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    log_level: String,

    /// Do not clear the terminal between screens.
    #[arg(long)]
    no_clear: bool,

    /// Hide the per-frame progress bar.
    #[arg(long)]
    no_progress: bool,
}

/// Draws one progress bar per conversion.
#[derive(Default)]
struct FrameProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl FrameProgress {
    fn new_bar(total: Option<u64>) -> ProgressBar {
        let bar = match total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} frames {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar
    }

    /// Drop the current bar, finished or not.
    fn clear(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl ProgressCallback for FrameProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if info.operation != OperationType::GifConversion {
            return;
        }
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        // A new conversion starts its count from one.
        if info.current <= 1 {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
        }
        let bar = slot.get_or_insert_with(|| Self::new_bar(info.total));

        if let Some(total) = info.total {
            bar.set_length(total);
        }
        bar.set_position(info.current);
        if let Some(timestamp) = info.current_timestamp {
            bar.set_message(format!("at {:.1}s", timestamp.as_secs_f64()));
        }

        if info.total == Some(info.current) && info.current_timestamp.is_none() {
            if let Some(finished) = slot.take() {
                finished.finish_and_clear();
            }
        }
    }
}

/// Marks the window in which Ctrl+C cancels a conversion instead of quitting.
struct InterruptiblePipeline<P> {
    inner: P,
    converting: Arc<AtomicBool>,
    progress: Option<Arc<FrameProgress>>,
}

impl<P: Pipeline> Pipeline for InterruptiblePipeline<P> {
    fn convert(&self, job: &ConversionJob) -> Result<(), VidgifError> {
        self.converting.store(true, Ordering::SeqCst);
        let result = self.inner.convert(job);
        self.converting.store(false, Ordering::SeqCst);

        // Failed or cancelled conversions never reach the final tick.
        if let Some(progress) = &self.progress {
            progress.clear();
        }
        result
    }
}

fn install_interrupt_handler(
    token: CancellationToken,
    converting: Arc<AtomicBool>,
) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if converting.load(Ordering::SeqCst) {
            token.cancel();
            return;
        }
        println!("\n\n{}", "Program terminated by user".yellow());
        std::process::exit(0);
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level: FfmpegLogLevel = cli.log_level.parse()?;
    vidgif::set_ffmpeg_log_level(level);
    let token = CancellationToken::new();
    let converting = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(token.clone(), Arc::clone(&converting))?;

    let progress = (!cli.no_progress).then(|| Arc::new(FrameProgress::default()));
    let mut ffmpeg = FfmpegPipeline::new().with_cancellation(token.clone());
    if let Some(progress) = &progress {
        ffmpeg = ffmpeg.with_progress(Arc::clone(progress) as Arc<dyn ProgressCallback>);
    }
    let pipeline = InterruptiblePipeline {
        inner: ffmpeg,
        converting,
        progress,
    };

    let options = MenuOptions {
        clear_screen: !cli.no_clear,
        verbose: cli.verbose,
        ..MenuOptions::default()
    };

    let stdin = io::stdin();
    Menu::new(stdin.lock(), io::stdout(), &pipeline)
        .with_options(options)
        .with_cancellation(token)
        .run()?;
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("\n{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
