//! Input validation.
//!
//! Helpers the console uses to check paths and parse numeric answers, plus
//! [`validate_settings`], which the pipeline runs before touching the source
//! so an impossible request fails fast with a readable reason.

use std::path::Path;

use crate::configuration::{ConversionSettings, VIDEO_EXTENSIONS};
use crate::error::VidgifError;

/// Frame rates above this play back unevenly in most GIF viewers.
const SMOOTH_FRAME_RATE_LIMIT: u32 = 50;

/// Returns `true` if the file name ends in `.` plus one of
/// [`VIDEO_EXTENSIONS`], ignoring case. A bare `.mp4` counts.
///
/// ```
/// assert!(vidgif::is_supported_video("holiday.MP4"));
/// assert!(vidgif::is_supported_video(".webm"));
/// assert!(!vidgif::is_supported_video("notes.txt"));
/// ```
pub fn is_supported_video<P: AsRef<Path>>(path: P) -> bool {
    let Some(name) = path.as_ref().file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|accepted| {
        name.strip_suffix(accepted)
            .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Check that a source exists and has an accepted extension.
///
/// # Errors
///
/// [`VidgifError::SourceNotFound`] if nothing exists at `path`,
/// [`VidgifError::UnsupportedExtension`] if the suffix is not a known video
/// container.
pub fn validate_source<P: AsRef<Path>>(path: P) -> Result<(), VidgifError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(VidgifError::SourceNotFound(path.to_path_buf()));
    }
    if !is_supported_video(path) {
        return Err(VidgifError::UnsupportedExtension(path.to_path_buf()));
    }
    Ok(())
}

/// Check that settings can be encoded as a GIF.
///
/// # Errors
///
/// [`VidgifError::InvalidFrameRate`] for a zero frame rate and
/// [`VidgifError::InvalidDimensions`] when either side of the target size is
/// zero or wider than a GIF logical screen allows.
pub fn validate_settings(settings: &ConversionSettings) -> Result<(), VidgifError> {
    if settings.frame_rate == 0 {
        return Err(VidgifError::InvalidFrameRate(settings.frame_rate));
    }
    if settings.frame_rate > SMOOTH_FRAME_RATE_LIMIT {
        log::warn!(
            "Frame rate {} exceeds {SMOOTH_FRAME_RATE_LIMIT} fps; many viewers clamp such short delays",
            settings.frame_rate,
        );
    }

    if let Some(size) = settings.target_size {
        validate_dimensions(size.width, size.height)?;
    }
    Ok(())
}

/// Check that a frame of `width` x `height` fits in a GIF.
pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<(), VidgifError> {
    let fits = |side: u32| side > 0 && side <= u32::from(u16::MAX);
    if fits(width) && fits(height) {
        Ok(())
    } else {
        Err(VidgifError::InvalidDimensions { width, height })
    }
}

/// Parse a frame-rate answer: digits only, greater than zero.
///
/// ```
/// assert_eq!(vidgif::parse_frame_rate(" 12 "), Some(12));
/// assert_eq!(vidgif::parse_frame_rate("0"), None);
/// assert_eq!(vidgif::parse_frame_rate("fast"), None);
/// ```
pub fn parse_frame_rate(input: &str) -> Option<u32> {
    parse_positive(input)
}

/// Parse a width or height answer in pixels.
pub fn parse_dimension(input: &str) -> Option<u32> {
    parse_positive(input)
}

fn parse_positive(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok().filter(|&value| value > 0)
}
