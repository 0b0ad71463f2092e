//! Single conversion jobs and their outcomes.
//!
//! [`convert`] is the boundary where pipeline errors stop propagating: it
//! always returns a [`ConversionOutcome`], successful or not.
//!
//! # Example
//!
//! ```no_run
//! use vidgif::{ConversionJob, ConversionSettings, FfmpegPipeline};
//!
//! let job = ConversionJob::new("clip.mp4", "clip.gif", ConversionSettings::new());
//! let outcome = vidgif::convert(job, &FfmpegPipeline::new());
//! match outcome.failure_reason() {
//!     None => println!("wrote {} bytes", outcome.produced_bytes().unwrap_or(0)),
//!     Some(reason) => eprintln!("failed: {reason}"),
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::configuration::{ConversionSettings, TargetSize};
use crate::error::VidgifError;
use crate::pipeline::Pipeline;

/// One source -> destination conversion request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    source_path: PathBuf,
    destination_path: PathBuf,
    settings: ConversionSettings,
}

impl ConversionJob {
    /// Build a job converting `source` into `destination` with `settings`.
    pub fn new<S, D>(source: S, destination: D, settings: ConversionSettings) -> Self
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        Self {
            source_path: source.as_ref().to_path_buf(),
            destination_path: destination.as_ref().to_path_buf(),
            settings,
        }
    }

    /// The video to read.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The GIF to write.
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// Output frames per second.
    pub fn frame_rate(&self) -> u32 {
        self.settings.frame_rate
    }

    /// Output size, if the frames are resized.
    pub fn target_size(&self) -> Option<TargetSize> {
        self.settings.target_size
    }

    /// Frame rate and size together.
    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }
}

/// The recorded result of attempting one job.
#[derive(Debug, Clone)]
#[must_use]
pub struct ConversionOutcome {
    job: ConversionJob,
    produced_bytes: Option<u64>,
    failure_reason: Option<String>,
    cancelled: bool,
}

impl ConversionOutcome {
    fn success(job: ConversionJob, produced_bytes: u64) -> Self {
        Self {
            job,
            produced_bytes: Some(produced_bytes),
            failure_reason: None,
            cancelled: false,
        }
    }

    fn failure(job: ConversionJob, error: &VidgifError) -> Self {
        Self {
            job,
            produced_bytes: None,
            failure_reason: Some(error.to_string()),
            cancelled: matches!(error, VidgifError::Cancelled),
        }
    }

    /// The job this outcome belongs to.
    pub fn job(&self) -> &ConversionJob {
        &self.job
    }

    /// Whether the destination was written.
    pub fn succeeded(&self) -> bool {
        self.failure_reason.is_none()
    }

    /// Size of the destination file on success.
    pub fn produced_bytes(&self) -> Option<u64> {
        self.produced_bytes
    }

    /// Why the conversion failed, if it did.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Whether the pipeline stopped because of a cancellation request.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Run one job through `pipeline`, exactly once.
///
/// Pipeline errors are turned into a failed outcome carrying the error
/// message. A failure after the destination was created may leave a partial
/// file on disk; it is never reported as success.
pub fn convert<P: Pipeline + ?Sized>(job: ConversionJob, pipeline: &P) -> ConversionOutcome {
    log::debug!(
        "Starting conversion {} -> {}",
        job.source_path.display(),
        job.destination_path.display(),
    );

    let result = pipeline
        .convert(&job)
        .and_then(|()| Ok(fs::metadata(&job.destination_path)?.len()));

    match result {
        Ok(bytes) => {
            log::info!(
                "Converted {} ({bytes} bytes written to {})",
                job.source_path.display(),
                job.destination_path.display(),
            );
            ConversionOutcome::success(job, bytes)
        }
        Err(error) => {
            log::warn!("Conversion of {} failed: {error}", job.source_path.display());
            ConversionOutcome::failure(job, &error)
        }
    }
}
