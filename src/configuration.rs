//! Conversion settings.
//!
//! [`ConversionSettings`] carries the frame rate and optional output size
//! shared by every job in a conversion, and [`BatchOptions`] adds the output
//! directory used by the batch orchestrator. Both are plain values passed
//! explicitly; nothing in the crate reads process-wide state.
//!
//! # Example
//!
//! ```
//! use vidgif::{ConversionSettings, Preset, TargetSize};
//!
//! let standard = Preset::Standard.settings();
//! assert_eq!(standard.frame_rate, 10);
//!
//! let custom = ConversionSettings::new()
//!     .with_frame_rate(12)
//!     .with_target_size(TargetSize::new(480, 270));
//! assert_eq!(custom.target_size, Some(TargetSize::new(480, 270)));
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// Frame rate used by the standard preset and whenever input is missing.
pub const DEFAULT_FRAME_RATE: u32 = 10;

/// Frame rate used by the high-quality preset.
pub const HIGH_QUALITY_FRAME_RATE: u32 = 15;

/// Output directory used by batch conversion when none is given.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "gif_output";

/// Extension given to every produced file.
pub const GIF_EXTENSION: &str = "gif";

/// Source extensions accepted for conversion (matched case-insensitively).
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TargetSize {
    /// Create a new size. Bounds are checked when the pipeline runs.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Display for TargetSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for TargetSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Named settings offered by the single-conversion menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// 10 fps at the source resolution.
    #[default]
    Standard,
    /// 15 fps at the source resolution.
    HighQuality,
}

impl Preset {
    /// The settings this preset stands for.
    pub fn settings(self) -> ConversionSettings {
        match self {
            Preset::Standard => ConversionSettings::new(),
            Preset::HighQuality => ConversionSettings::new().with_frame_rate(HIGH_QUALITY_FRAME_RATE),
        }
    }
}

/// Frame rate and resize settings for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSettings {
    /// Output frames per second. Must be greater than zero.
    pub frame_rate: u32,
    /// Output size. `None` keeps the source resolution.
    pub target_size: Option<TargetSize>,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionSettings {
    /// Standard settings: [`DEFAULT_FRAME_RATE`], no resize.
    pub fn new() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            target_size: None,
        }
    }

    /// Set the output frame rate.
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Resize every output frame to `size`.
    #[must_use]
    pub fn with_target_size(mut self, size: TargetSize) -> Self {
        self.target_size = Some(size);
        self
    }

    /// Set or clear the output size.
    #[must_use]
    pub fn with_resolution(mut self, size: Option<TargetSize>) -> Self {
        self.target_size = size;
        self
    }

    /// Resolve the output dimensions for a source of the given size.
    pub(crate) fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match self.target_size {
            Some(size) => (size.width, size.height),
            None => (source_width, source_height),
        }
    }
}

/// Settings shared by every job of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Frame rate and resize applied to each job.
    pub settings: ConversionSettings,
    /// Directory receiving the produced GIFs. Created if missing.
    pub output_directory: PathBuf,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            settings: ConversionSettings::new(),
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
        }
    }
}

impl BatchOptions {
    /// Default settings writing into `output_directory`.
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            settings: ConversionSettings::new(),
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    /// Replace the shared conversion settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Default destination name for a source: its file stem plus `.gif`.
///
/// Sources without a usable stem fall back to `output.gif`.
pub fn default_gif_name<P: AsRef<Path>>(source: P) -> PathBuf {
    let mut name = source
        .as_ref()
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "output".into());
    // Appended rather than `with_extension`, which would eat dotted stems.
    name.push(".");
    name.push(GIF_EXTENSION);
    PathBuf::from(name)
}
