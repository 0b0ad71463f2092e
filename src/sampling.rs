//! Frame sampling and GIF timing.
//!
//! A GIF at `n` fps shows one picture per slot of `1/n` seconds. Decoded
//! frames are mapped onto those slots by [`FrameSampler`]: the first frame
//! that lands in a slot is kept, later ones in the same slot are dropped.
//! When the source is slower than the target rate a kept frame covers
//! several slots, and [`slot_delay`] stretches its delay to match, so the
//! animation keeps the source's real-time pacing.
//!
//! ```
//! use vidgif::sampling::{FrameSampler, slot_delay};
//!
//! let mut sampler = FrameSampler::new(10);
//! assert_eq!(sampler.accept(Some(0.00)), Some(0));
//! assert_eq!(sampler.accept(Some(0.04)), None); // same 100 ms slot
//! assert_eq!(sampler.accept(Some(0.10)), Some(1));
//!
//! assert_eq!(slot_delay(0, 1, 10), 10); // 10 hundredths of a second
//! ```

/// Tolerance absorbing float error when a timestamp sits on a slot boundary.
const BOUNDARY_EPSILON: f64 = 1e-6;

/// Maps decoded frame timestamps onto output frame slots.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    frame_rate: u32,
    last_slot: Option<u64>,
}

impl FrameSampler {
    /// Create a sampler for `frame_rate` output frames per second.
    ///
    /// A zero rate is treated as one frame per second; callers validate the
    /// rate before sampling.
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            last_slot: None,
        }
    }

    /// Offer a frame shown at `seconds` from the start of the stream.
    ///
    /// Returns the slot the frame fills, or `None` if its slot is already
    /// taken. Frames without a timestamp take the slot after the last one.
    pub fn accept(&mut self, seconds: Option<f64>) -> Option<u64> {
        let slot = match seconds {
            Some(seconds) => self.slot_at(seconds),
            None => self.last_slot.map_or(0, |last| last + 1),
        };

        match self.last_slot {
            Some(last) if slot <= last => None,
            _ => {
                self.last_slot = Some(slot);
                Some(slot)
            }
        }
    }

    /// Slot containing the instant `seconds`.
    pub fn slot_at(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * f64::from(self.frame_rate) + BOUNDARY_EPSILON).floor() as u64
    }
}

/// Delay in hundredths of a second for a frame shown from slot `from` until
/// slot `until`.
///
/// Slot boundaries are rounded to whole hundredths individually, so the
/// rounding error never accumulates across a long animation. The result is
/// at least 1.
pub fn slot_delay(from: u64, until: u64, frame_rate: u32) -> u16 {
    let frame_rate = u64::from(frame_rate.max(1));
    let centiseconds = |slot: u64| (slot.saturating_mul(100) + frame_rate / 2) / frame_rate;
    let delay = centiseconds(until).saturating_sub(centiseconds(from));
    u16::try_from(delay).unwrap_or(u16::MAX).max(1)
}
