//! Internal helpers for pixel copying and timestamp arithmetic.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// FFmpeg's `AV_NOPTS_VALUE`: a timestamp that was never set.
const NO_TIMESTAMP: i64 = i64::MIN;

/// Copy the first plane of a packed RGBA frame into a tightly-packed buffer.
///
/// FFmpeg rows may carry padding past `width * 4` bytes; it is stripped so
/// the result can go straight into [`image::RgbaImage::from_raw`].
pub(crate) fn frame_to_rgba_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 4;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Seconds elapsed between a stream's start and `pts`, in the stream's
/// time base. Negative offsets clamp to zero.
pub(crate) fn pts_to_seconds(pts: i64, start_time: i64, time_base: Rational) -> f64 {
    if time_base.denominator() == 0 {
        return 0.0;
    }
    let origin = if start_time == NO_TIMESTAMP { 0 } else { start_time };
    let offset = pts.saturating_sub(origin).max(0);
    offset as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Container duration (reported in microseconds) as a [`Duration`].
pub(crate) fn container_duration(microseconds: i64) -> Duration {
    if microseconds > 0 {
        Duration::from_micros(microseconds as u64)
    } else {
        Duration::ZERO
    }
}
