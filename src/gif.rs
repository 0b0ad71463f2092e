//! Animated GIF encoding.
//!
//! [`GifWriter`] streams sampled frames into a GIF file. Each frame is held
//! back until the next one arrives, because its delay depends on how many
//! output slots it covers. The destination file is created on the first
//! frame, so a conversion that never decodes anything leaves no file behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gif::{Encoder, Frame, Repeat};
use image::RgbaImage;

use crate::error::VidgifError;
use crate::sampling::slot_delay;

/// Quantiser speed passed to [`Frame::from_rgba_speed`] (1 = best, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

struct PendingFrame {
    image: RgbaImage,
    slot: u64,
}

/// Streaming GIF encoder for one destination file.
pub(crate) struct GifWriter {
    path: PathBuf,
    frame_rate: u32,
    encoder: Option<Encoder<BufWriter<File>>>,
    pending: Option<PendingFrame>,
    frames_written: u64,
}

impl GifWriter {
    pub(crate) fn new<P: AsRef<Path>>(path: P, frame_rate: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frame_rate,
            encoder: None,
            pending: None,
            frames_written: 0,
        }
    }

    /// Queue a frame for `slot`, writing the previously queued one.
    pub(crate) fn push(&mut self, image: RgbaImage, slot: u64) -> Result<(), VidgifError> {
        if self.encoder.is_none() {
            self.encoder = Some(self.create_encoder(image.width(), image.height())?);
        }

        if let Some(previous) = self.pending.take() {
            let delay = slot_delay(previous.slot, slot, self.frame_rate);
            self.write(previous.image, delay)?;
        }

        self.pending = Some(PendingFrame { image, slot });
        Ok(())
    }

    /// Write the last frame and the GIF trailer.
    ///
    /// Returns the number of frames in the file.
    ///
    /// # Errors
    ///
    /// [`VidgifError::NoFramesDecoded`] if no frame was ever pushed. Nothing
    /// is written to disk in that case.
    pub(crate) fn finish(mut self) -> Result<u64, VidgifError> {
        let Some(last) = self.pending.take() else {
            return Err(VidgifError::NoFramesDecoded(self.path));
        };
        let delay = slot_delay(last.slot, last.slot + 1, self.frame_rate);
        self.write(last.image, delay)?;

        if let Some(encoder) = self.encoder.take() {
            let mut writer = encoder.into_inner()?;
            writer.flush()?;
        }

        log::debug!(
            "Finished GIF {} ({} frames at {} fps)",
            self.path.display(),
            self.frames_written,
            self.frame_rate,
        );
        Ok(self.frames_written)
    }

    fn create_encoder(&self, width: u32, height: u32) -> Result<Encoder<BufWriter<File>>, VidgifError> {
        let (width, height) = gif_dimensions(width, height)?;
        log::debug!(
            "Creating GIF file {} ({width}x{height})",
            self.path.display(),
        );

        let file = File::create(&self.path).map_err(|e| {
            VidgifError::GifEncodeError(format!(
                "Failed to create GIF file {}: {e}",
                self.path.display()
            ))
        })?;

        let mut encoder = Encoder::new(BufWriter::new(file), width, height, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(encoder)
    }

    fn write(&mut self, image: RgbaImage, delay: u16) -> Result<(), VidgifError> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| VidgifError::GifEncodeError("GIF encoder was not initialised".to_string()))?;

        let (width, height) = gif_dimensions(image.width(), image.height())?;
        let mut pixels = image.into_raw();
        let mut frame = Frame::from_rgba_speed(width, height, &mut pixels, QUANTIZER_SPEED);
        frame.delay = delay;

        encoder.write_frame(&frame)?;
        self.frames_written += 1;
        Ok(())
    }
}

fn gif_dimensions(width: u32, height: u32) -> Result<(u16, u16), VidgifError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(VidgifError::InvalidDimensions { width, height }),
    }
}
