//! Source video metadata.
//!
//! Extracted once by [`MediaFile::open`](crate::MediaFile::open) and cached
//! for the lifetime of the file.

use std::time::Duration;

/// Metadata for the best video stream of a source file.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Container duration. Zero when the container does not report one.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Number of GIF frames a conversion at `frame_rate` is expected to
    /// produce, or `None` when the duration is unknown.
    pub fn expected_gif_frames(&self, frame_rate: u32) -> Option<u64> {
        if self.duration.is_zero() || frame_rate == 0 {
            return None;
        }
        Some((self.duration.as_secs_f64() * f64::from(frame_rate)).ceil() as u64)
    }
}
