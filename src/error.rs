//! Error types for the `vidgif` crate.
//!
//! [`VidgifError`] is returned by every fallible operation in the crate.
//! Pipeline errors never escape a single conversion: the handler in
//! [`crate::job`] turns them into a failed
//! [`ConversionOutcome`](crate::ConversionOutcome) carrying the error's
//! display text.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `vidgif` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VidgifError {
    /// The source video could not be opened by FFmpeg.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A path supplied by the user does not exist.
    #[error("File not found: {0}")]
    SourceNotFound(PathBuf),

    /// The source file does not carry one of the accepted video extensions.
    #[error("Unsupported file type: {0} (supported: .mp4, .avi, .mov, .mkv, .webm)")]
    UnsupportedExtension(PathBuf),

    /// The source contains no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// Decoding finished without producing a single frame.
    #[error("No frames could be decoded from {0}")]
    NoFramesDecoded(PathBuf),

    /// The requested frame rate is not a positive integer.
    #[error("Invalid frame rate: {0} (must be greater than zero)")]
    InvalidFrameRate(u32),

    /// The requested output size cannot be encoded as a GIF.
    #[error("Invalid dimensions {width}x{height}: each side must be between 1 and 65535 pixels")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// GIF encoding failed.
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// Standard input was closed while a prompt was waiting for an answer.
    #[error("Input stream closed")]
    InputClosed,
}

impl From<FfmpegError> for VidgifError {
    fn from(error: FfmpegError) -> Self {
        VidgifError::FfmpegError(error.to_string())
    }
}

impl From<::gif::EncodingError> for VidgifError {
    fn from(error: ::gif::EncodingError) -> Self {
        VidgifError::GifEncodeError(error.to_string())
    }
}
