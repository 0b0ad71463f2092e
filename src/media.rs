//! Source video access.
//!
//! [`MediaFile`] owns the FFmpeg demuxer context for one source. Opening it
//! acquires the source; dropping it releases the context, so every exit path
//! of a conversion (success, decode error, encode error, cancellation) hands
//! the file back without explicit cleanup.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbaImage;

use crate::{
    error::VidgifError,
    metadata::VideoMetadata,
    progress::{self, CancellationToken},
    sampling::FrameSampler,
    utilities,
};

/// One decoded frame selected for the GIF.
#[derive(Debug)]
pub(crate) struct SampledFrame {
    /// Frame pixels, already scaled to the output size.
    pub(crate) image: RgbaImage,
    /// Output slot the frame fills.
    pub(crate) slot: u64,
    /// Where the frame sits in the source.
    pub(crate) timestamp: Duration,
}

/// An opened source video.
///
/// # Example
///
/// ```no_run
/// use vidgif::{MediaFile, VidgifError};
///
/// let media = MediaFile::open("clip.mp4")?;
/// let video = media.metadata();
/// println!("{}x{} @ {:.2} fps", video.width, video.height, video.frames_per_second);
/// # Ok::<(), VidgifError>(())
/// ```
pub struct MediaFile {
    input_context: Input,
    metadata: VideoMetadata,
    video_stream_index: usize,
    file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a source video and read its metadata.
    ///
    /// # Errors
    ///
    /// [`VidgifError::FileOpen`] if FFmpeg cannot open or probe the file
    /// (missing, unreadable, corrupt, unsupported codec) and
    /// [`VidgifError::NoVideoStream`] if it holds no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VidgifError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let open_error = |reason: String| VidgifError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening media file: {}", path.display());

        ffmpeg_next::init().map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(VidgifError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("Failed to read video codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let frames_per_second = rational_to_f64(stream.avg_frame_rate())
            .or_else(|| rational_to_f64(stream.rate()))
            .unwrap_or(0.0);

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            duration: utilities::container_duration(input_context.duration()),
            codec,
            format: input_context.format().name().to_string(),
        };

        log::info!(
            "Opened media file: {} ({}x{}, {:.2} fps, {:.2}s, codec={})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.duration.as_secs_f64(),
            metadata.codec,
        );

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            file_path,
        })
    }

    /// Metadata of the video stream being converted.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Decode the whole video stream and pass each frame chosen for a
    /// `frame_rate` GIF, scaled to `width` x `height` RGBA, to `handler`.
    ///
    /// Decoding stops at the first error from FFmpeg or from `handler`, or
    /// with [`VidgifError::Cancelled`] once `cancellation` is set.
    pub(crate) fn sample_frames<F>(
        &mut self,
        frame_rate: u32,
        (width, height): (u32, u32),
        cancellation: Option<&CancellationToken>,
        mut handler: F,
    ) -> Result<(), VidgifError>
    where
        F: FnMut(SampledFrame) -> Result<(), VidgifError>,
    {
        let video_stream_index = self.video_stream_index;
        let stream = self
            .input_context
            .stream(video_stream_index)
            .ok_or(VidgifError::NoVideoStream)?;
        let time_base = stream.time_base();
        let start_time = stream.start_time();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let mut sampling = Sampling {
            scaler,
            sampler: FrameSampler::new(frame_rate),
            decoded_frame: VideoFrame::empty(),
            rgba_frame: VideoFrame::empty(),
            time_base,
            start_time,
            width,
            height,
        };

        for (stream, packet) in self.input_context.packets() {
            if progress::is_cancelled(cancellation) {
                return Err(VidgifError::Cancelled);
            }
            if stream.index() != video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            sampling.drain(&mut decoder, &mut handler)?;
        }

        decoder.send_eof()?;
        sampling.drain(&mut decoder, &mut handler)
    }
}

/// Per-conversion decoding state shared by the packet loop and the flush.
struct Sampling {
    scaler: ScalingContext,
    sampler: FrameSampler,
    decoded_frame: VideoFrame,
    rgba_frame: VideoFrame,
    time_base: Rational,
    start_time: i64,
    width: u32,
    height: u32,
}

impl Sampling {
    /// Pull every frame the decoder has ready and forward the sampled ones.
    fn drain<F>(&mut self, decoder: &mut VideoDecoder, handler: &mut F) -> Result<(), VidgifError>
    where
        F: FnMut(SampledFrame) -> Result<(), VidgifError>,
    {
        while decoder.receive_frame(&mut self.decoded_frame).is_ok() {
            let seconds = self
                .decoded_frame
                .timestamp()
                .or_else(|| self.decoded_frame.pts())
                .map(|pts| utilities::pts_to_seconds(pts, self.start_time, self.time_base));

            let Some(slot) = self.sampler.accept(seconds) else {
                continue;
            };

            self.scaler.run(&self.decoded_frame, &mut self.rgba_frame)?;
            let buffer = utilities::frame_to_rgba_buffer(&self.rgba_frame, self.width, self.height);
            let image = RgbaImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
                VidgifError::VideoDecodeError(
                    "Failed to construct RGBA image from decoded frame data".to_string(),
                )
            })?;

            handler(SampledFrame {
                image,
                slot,
                timestamp: Duration::from_secs_f64(seconds.unwrap_or(0.0)),
            })?;
        }
        Ok(())
    }
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    (rate.denominator() != 0 && rate.numerator() > 0)
        .then(|| f64::from(rate.numerator()) / f64::from(rate.denominator()))
}
