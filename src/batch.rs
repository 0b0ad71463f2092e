//! Batch conversion.
//!
//! [`BatchRunner`] turns a [`BatchSource`] into candidate files, builds one
//! [`ConversionJob`] per candidate with the shared [`BatchOptions`], and runs
//! them one after another. A failing job is recorded and the batch moves on.
//!
//! # Example
//!
//! ```no_run
//! use vidgif::{BatchOptions, BatchRunner, BatchSource, FfmpegPipeline, VidgifError};
//!
//! let pipeline = FfmpegPipeline::new();
//! let result = BatchRunner::new(&pipeline).run(
//!     &BatchSource::Directory("videos".into()),
//!     &BatchOptions::default(),
//! )?;
//! println!("{}/{} converted", result.succeeded, result.total);
//! # Ok::<(), VidgifError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    configuration::{self, BatchOptions},
    error::VidgifError,
    job::{self, ConversionJob, ConversionOutcome},
    pipeline::Pipeline,
    progress::{self, CancellationToken, NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
    validation,
};

/// Where batch candidates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSource {
    /// Every video file directly inside this directory, in the order the
    /// filesystem lists them.
    Directory(PathBuf),
    /// These paths, in this order. Paths that do not exist are dropped.
    Files(Vec<PathBuf>),
}

/// Accumulated result of a batch.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct BatchResult {
    /// Number of jobs attempted.
    pub total: usize,
    /// Number of jobs that succeeded.
    pub succeeded: usize,
    /// One outcome per attempted job, in job order.
    pub outcomes: Vec<ConversionOutcome>,
    /// `true` if a cancellation stopped the batch.
    pub interrupted: bool,
}

impl BatchResult {
    /// Number of jobs that failed.
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    fn record(&mut self, outcome: ConversionOutcome) {
        self.total += 1;
        if outcome.succeeded() {
            self.succeeded += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Receives per-job events while a batch runs.
///
/// `index` is zero-based; `total` is the number of candidates.
pub trait BatchObserver {
    /// Called before a job is handed to the pipeline.
    fn job_started(&self, _index: usize, _total: usize, _job: &ConversionJob) {}

    /// Called with the job's outcome, before the next job starts.
    fn job_finished(&self, _index: usize, _total: usize, _outcome: &ConversionOutcome) {}
}

struct NoOpObserver;

impl BatchObserver for NoOpObserver {}

/// Runs batches through a [`Pipeline`].
pub struct BatchRunner<'a> {
    pipeline: &'a dyn Pipeline,
    observer: &'a dyn BatchObserver,
    progress: Arc<dyn ProgressCallback>,
    cancellation: Option<CancellationToken>,
}

impl Debug for BatchRunner<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BatchRunner")
            .field("has_cancellation", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> BatchRunner<'a> {
    /// A runner converting through `pipeline`.
    pub fn new(pipeline: &'a dyn Pipeline) -> Self {
        Self {
            pipeline,
            observer: &NoOpObserver,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// Send per-job events to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn BatchObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Report each finished job to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Stop before the next job once `token` is cancelled.
    ///
    /// Outcomes recorded so far are kept and the result is marked
    /// [`interrupted`](BatchResult::interrupted). A job whose pipeline
    /// reports [`VidgifError::Cancelled`] stops the batch the same way,
    /// with or without a token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Discover candidates from `source` and convert them all.
    ///
    /// # Errors
    ///
    /// Errors from [`discover`] or from creating the output directory. Job
    /// failures are never errors; they are recorded in the result.
    pub fn run(&self, source: &BatchSource, options: &BatchOptions) -> Result<BatchResult, VidgifError> {
        let candidates = discover(source)?;
        self.run_candidates(&candidates, options)
    }

    /// Convert already-discovered candidates, in order.
    ///
    /// # Errors
    ///
    /// [`VidgifError::IoError`] if the output directory cannot be created.
    pub fn run_candidates(
        &self,
        candidates: &[PathBuf],
        options: &BatchOptions,
    ) -> Result<BatchResult, VidgifError> {
        fs::create_dir_all(&options.output_directory)?;

        let total = candidates.len();
        log::info!(
            "Starting batch of {total} file(s) into {}",
            options.output_directory.display(),
        );

        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::BatchConversion,
            Some(total as u64),
        );
        let mut result = BatchResult::default();

        for (index, source) in candidates.iter().enumerate() {
            if progress::is_cancelled(self.cancellation.as_ref()) {
                log::warn!("Batch cancelled after {index} of {total} job(s)");
                result.interrupted = true;
                break;
            }

            let destination = destination_for(source, &options.output_directory);
            let job = ConversionJob::new(source, destination, options.settings);

            self.observer.job_started(index, total, &job);
            let outcome = job::convert(job, self.pipeline);
            self.observer.job_finished(index, total, &outcome);

            let stop = outcome.was_cancelled();
            result.record(outcome);
            tracker.advance(None);

            let remaining = total - index - 1;
            if stop || (remaining > 0 && progress::is_cancelled(self.cancellation.as_ref())) {
                log::warn!("Batch cancelled with {remaining} job(s) left");
                result.interrupted = true;
                break;
            }
        }

        log::info!(
            "Batch finished: {}/{} converted",
            result.succeeded,
            result.total,
        );
        Ok(result)
    }
}

/// Resolve the candidate files of a batch.
///
/// Directory mode keeps entries with a supported video extension (case
/// insensitive) and skips subdirectories. List mode keeps the caller's order
/// and drops paths that do not exist.
///
/// # Errors
///
/// [`VidgifError::SourceNotFound`] if the directory does not exist, or
/// [`VidgifError::IoError`] if it cannot be listed.
pub fn discover(source: &BatchSource) -> Result<Vec<PathBuf>, VidgifError> {
    match source {
        BatchSource::Directory(directory) => scan_directory(directory),
        BatchSource::Files(paths) => Ok(paths
            .iter()
            .filter(|path| {
                let exists = path.exists();
                if !exists {
                    log::warn!("Skipping missing file: {}", path.display());
                }
                exists
            })
            .cloned()
            .collect()),
    }
}

fn scan_directory(directory: &Path) -> Result<Vec<PathBuf>, VidgifError> {
    if !directory.exists() {
        return Err(VidgifError::SourceNotFound(directory.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if validation::is_supported_video(&path) {
            candidates.push(path);
        }
    }

    log::debug!(
        "Found {} video file(s) in {}",
        candidates.len(),
        directory.display(),
    );
    Ok(candidates)
}

/// Destination of `source` inside `output_directory`: its stem plus `.gif`.
pub fn destination_for(source: &Path, output_directory: &Path) -> PathBuf {
    output_directory.join(configuration::default_gif_name(source))
}
