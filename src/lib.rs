//! # vidgif
//!
//! Convert video files to animated GIFs, one at a time or in batches.
//!
//! Decoding, frame sampling and scaling are done by FFmpeg through the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; palette
//! quantisation and encoding by the [`gif`](https://crates.io/crates/gif)
//! crate. This crate adds the job and batch bookkeeping around them and the
//! interactive console used by the `vidgif` binary.
//!
//! ## Quick Start
//!
//! ### Convert One Video
//!
//! ```no_run
//! use vidgif::{ConversionJob, FfmpegPipeline, Preset};
//!
//! let job = ConversionJob::new("clip.mp4", "clip.gif", Preset::Standard.settings());
//! let outcome = vidgif::convert(job, &FfmpegPipeline::new());
//! assert!(outcome.succeeded());
//! ```
//!
//! ### Convert a Folder
//!
//! ```no_run
//! use vidgif::{
//!     BatchOptions, BatchRunner, BatchSource, ConversionSettings, FfmpegPipeline, TargetSize,
//! };
//!
//! let options = BatchOptions::new("gif_output").with_settings(
//!     ConversionSettings::new()
//!         .with_frame_rate(12)
//!         .with_target_size(TargetSize::new(480, 270)),
//! );
//! let pipeline = FfmpegPipeline::new();
//! let result = BatchRunner::new(&pipeline)
//!     .run(&BatchSource::Directory("videos".into()), &options)
//!     .unwrap();
//! for outcome in &result.outcomes {
//!     println!("{}: {}", outcome.job().source_path().display(), outcome.succeeded());
//! }
//! ```
//!
//! ## Behaviour Notes
//!
//! - Conversions are strictly sequential.
//! - A failed job never aborts a batch; its reason is kept in the
//!   [`ConversionOutcome`].
//! - A failure after encoding started can leave a partial GIF on disk.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
mod gif;
pub mod job;
pub mod media;
pub mod menu;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod sampling;
mod utilities;
pub mod validation;

pub use batch::{BatchObserver, BatchResult, BatchRunner, BatchSource, destination_for, discover};
pub use configuration::{
    BatchOptions, ConversionSettings, DEFAULT_FRAME_RATE, DEFAULT_OUTPUT_DIRECTORY, GIF_EXTENSION,
    HIGH_QUALITY_FRAME_RATE, Preset, TargetSize, VIDEO_EXTENSIONS, default_gif_name,
};
pub use error::VidgifError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use job::{ConversionJob, ConversionOutcome, convert};
pub use media::MediaFile;
pub use menu::{Menu, MenuOptions, format_kilobytes};
pub use metadata::VideoMetadata;
pub use pipeline::{FfmpegPipeline, Pipeline};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use validation::{
    is_supported_video, parse_dimension, parse_frame_rate, validate_settings, validate_source,
};
