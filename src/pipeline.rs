//! The conversion pipeline.
//!
//! [`Pipeline`] is the seam between job handling and the media libraries:
//! given one [`ConversionJob`] it decodes, resizes and encodes, or fails.
//! [`FfmpegPipeline`] is the real implementation; tests substitute their own.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::{
    error::VidgifError,
    gif::GifWriter,
    job::ConversionJob,
    media::MediaFile,
    progress::{CancellationToken, NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
    validation,
};

/// Performs the decode / resize / encode work for one job.
pub trait Pipeline {
    /// Convert `job.source_path()` into a GIF at `job.destination_path()`.
    ///
    /// An existing destination is overwritten. Implementations must release
    /// everything they acquired before returning, whatever the result.
    fn convert(&self, job: &ConversionJob) -> Result<(), VidgifError>;
}

impl<P: Pipeline + ?Sized> Pipeline for &P {
    fn convert(&self, job: &ConversionJob) -> Result<(), VidgifError> {
        (**self).convert(job)
    }
}

/// FFmpeg decoding plus `gif` crate encoding.
///
/// Frames are sampled at the job's frame rate, scaled to the target size (or
/// kept at the source size), quantised to a 256-colour palette per frame and
/// written as an infinitely looping GIF.
#[derive(Clone)]
pub struct FfmpegPipeline {
    progress: Arc<dyn ProgressCallback>,
    cancellation: Option<CancellationToken>,
}

impl Debug for FfmpegPipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegPipeline")
            .field("has_cancellation", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for FfmpegPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegPipeline {
    /// A pipeline with no progress callback and no cancellation.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// Report each encoded frame to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Stop decoding with [`VidgifError::Cancelled`] once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl Pipeline for FfmpegPipeline {
    fn convert(&self, job: &ConversionJob) -> Result<(), VidgifError> {
        let settings = job.settings();
        validation::validate_settings(settings)?;

        // Dropped at the end of this scope on every path, releasing the source.
        let mut media = MediaFile::open(job.source_path())?;
        let video = media.metadata().clone();
        let dimensions = settings.resolve_dimensions(video.width, video.height);
        validation::validate_dimensions(dimensions.0, dimensions.1)?;

        log::debug!(
            "Converting {} -> {} at {} fps, {}x{}",
            job.source_path().display(),
            job.destination_path().display(),
            settings.frame_rate,
            dimensions.0,
            dimensions.1,
        );

        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::GifConversion,
            video.expected_gif_frames(settings.frame_rate),
        );
        let mut writer = GifWriter::new(job.destination_path(), settings.frame_rate);

        media.sample_frames(
            settings.frame_rate,
            dimensions,
            self.cancellation.as_ref(),
            |frame| {
                writer.push(frame.image, frame.slot)?;
                tracker.advance(Some(frame.timestamp));
                Ok(())
            },
        )?;

        let frames = writer.finish().map_err(|error| match error {
            VidgifError::NoFramesDecoded(_) => VidgifError::NoFramesDecoded(media.path().to_path_buf()),
            other => other,
        })?;
        tracker.finish();

        log::info!(
            "Encoded {frames} frames from {} into {}",
            job.source_path().display(),
            job.destination_path().display(),
        );
        Ok(())
    }
}
