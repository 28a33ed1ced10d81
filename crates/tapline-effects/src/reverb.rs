//! Eight-tap integer feedback echo.
//!
//! Eight feedback comb taps of slightly different, nearly coprime lengths
//! share one rolling cursor. Each input sample is attenuated by 1/8 and fed
//! into every tap; the output adds the taps back with alternating sign
//! (odd taps added, even taps subtracted), which gives a diffuse tail rather
//! than a periodic echo.
//!
//! # Tap lengths
//!
//! Lengths are derived from the sample rate at allocation time:
//!
//! ```text
//! length[n] = TAP_BASES[n] * sample_rate / REVERBERATION    (truncating)
//! ```
//!
//! At 44.1 kHz this gives 2004, 2035, 2130, 2286, 2505, 2787, 3132, 3539
//! samples (45 to 80 ms).
//!
//! # Per-sample recurrence
//!
//! With `loc[n] = cursor % length[n]` computed before the write:
//!
//! ```text
//! in = x >> 3
//! tap[n][loc[n]] = in + ((pct * tap[n][loc[n]]) >> 7)      for each n
//! cursor += 1, recompute loc
//! y = x + tap1 - tap2 + tap3 - tap4 + tap5 - tap6 + tap7 - tap8   (at loc)
//! ```
//!
//! `pct` is `58 + 4 * amount` for mono and `63 + 4 * amount` for stereo,
//! with `amount` clamped to `0..=15`. Stereo keeps a second set of eight
//! taps for the right channel, addressed with the same locations.
//!
//! All arithmetic wraps; shifts are arithmetic and truncate.

use core::fmt;
use tapline_core::{ChannelLayout, TapLine, TapLineError};

/// Number of taps per channel.
pub const TAP_COUNT: usize = 8;

/// Divisor applied to `base * sample_rate` when sizing taps.
pub const REVERBERATION: u64 = 110_000;

/// Per-tap length constants, in units of `sample_rate / REVERBERATION`.
pub const TAP_BASES: [u64; TAP_COUNT] = [5000, 5078, 5313, 5703, 6250, 6953, 7813, 8828];

/// Largest effective reverb amount; larger inputs behave as this value.
pub const MAX_AMOUNT: u8 = 15;

/// Feedback offset for mono processing.
pub const MONO_FEEDBACK_BASE: i32 = 58;

/// Feedback offset for stereo processing.
pub const STEREO_FEEDBACK_BASE: i32 = 63;

/// Tap lengths for `sample_rate`, in samples.
///
/// ```rust
/// use tapline_effects::tap_lengths;
///
/// assert_eq!(
///     tap_lengths(44100),
///     [2004, 2035, 2130, 2286, 2505, 2787, 3132, 3539]
/// );
/// ```
pub fn tap_lengths(sample_rate: u32) -> [usize; TAP_COUNT] {
    TAP_BASES.map(|base| (base * u64::from(sample_rate) / REVERBERATION) as usize)
}

/// Feedback numerator (over 128) for `amount` under `layout`.
///
/// `amount` is clamped to [`MAX_AMOUNT`].
#[inline]
pub fn feedback_pct(layout: ChannelLayout, amount: u8) -> i32 {
    let base = match layout {
        ChannelLayout::Mono => MONO_FEEDBACK_BASE,
        ChannelLayout::Stereo => STEREO_FEEDBACK_BASE,
    };
    base + (i32::from(amount.min(MAX_AMOUNT)) << 2)
}

/// Failure to prepare the delay lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverbError {
    /// The shortest tap would be zero samples long.
    SampleRateTooLow {
        /// Rate that was requested.
        sample_rate: u32,
    },
    /// A delay line could not be allocated.
    Allocation(TapLineError),
}

impl fmt::Display for ReverbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReverbError::SampleRateTooLow { sample_rate } => {
                write!(f, "sample rate {} Hz is too low for reverb taps", sample_rate)
            }
            ReverbError::Allocation(e) => write!(f, "reverb allocation failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReverbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReverbError::Allocation(e) => Some(e),
            ReverbError::SampleRateTooLow { .. } => None,
        }
    }
}

impl From<TapLineError> for ReverbError {
    fn from(e: TapLineError) -> Self {
        ReverbError::Allocation(e)
    }
}

/// One channel's eight taps.
#[derive(Debug)]
struct TapBank {
    taps: [TapLine; TAP_COUNT],
}

impl TapBank {
    fn try_new(lengths: [usize; TAP_COUNT]) -> Result<Self, TapLineError> {
        let [l1, l2, l3, l4, l5, l6, l7, l8] = lengths;
        Ok(Self {
            taps: [
                TapLine::try_new(l1)?,
                TapLine::try_new(l2)?,
                TapLine::try_new(l3)?,
                TapLine::try_new(l4)?,
                TapLine::try_new(l5)?,
                TapLine::try_new(l6)?,
                TapLine::try_new(l7)?,
                TapLine::try_new(l8)?,
            ],
        })
    }

    #[inline]
    fn locations(&self, cursor: u32) -> [usize; TAP_COUNT] {
        core::array::from_fn(|n| self.taps[n].position(cursor))
    }

    #[inline]
    fn feed(&mut self, loc: &[usize; TAP_COUNT], input: i32, pct: i32) {
        for (tap, &pos) in self.taps.iter_mut().zip(loc) {
            tap.feed(pos, input, pct);
        }
    }

    #[inline]
    fn echo(&self, loc: &[usize; TAP_COUNT]) -> i32 {
        let mut sum = 0i32;
        for (n, (tap, &pos)) in self.taps.iter().zip(loc).enumerate() {
            let v = tap.read(pos);
            sum = if n % 2 == 0 {
                sum.wrapping_add(v)
            } else {
                sum.wrapping_sub(v)
            };
        }
        sum
    }

    fn is_silent(&self) -> bool {
        self.taps.iter().all(TapLine::is_silent)
    }
}

/// Eight-tap integer feedback echo over accumulator samples.
///
/// Delay lines are not allocated by [`new`](Self::new); call
/// [`ensure_allocated`](Self::ensure_allocated) before processing.
/// Processing an unallocated channel set leaves the buffer untouched.
///
/// # Example
///
/// ```rust
/// use tapline_core::ChannelLayout;
/// use tapline_effects::Reverb;
///
/// let mut reverb = Reverb::new();
/// reverb.ensure_allocated(44100, ChannelLayout::Mono).unwrap();
///
/// let mut block = vec![0i32; 4096];
/// block[0] = 10_000;
/// reverb.process_mono(&mut block, 4096, 8);
/// assert_eq!(block[2003], 1250);
/// ```
#[derive(Debug, Default)]
pub struct Reverb {
    left: Option<TapBank>,
    right: Option<TapBank>,
    sample_rate: Option<u32>,
    cursor: u32,
}

impl Reverb {
    /// Create an unallocated reverb.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the delay lines `layout` needs, sized for `sample_rate`.
    ///
    /// Idempotent. Once allocated, tap lengths stay keyed to the rate of the
    /// first allocation until [`release`](Self::release); a later call with a
    /// different rate does not resize. Switching from mono to stereo adds the
    /// right-channel taps at the original rate.
    ///
    /// Allocation is all-or-nothing: on error nothing new is kept.
    pub fn ensure_allocated(
        &mut self,
        sample_rate: u32,
        layout: ChannelLayout,
    ) -> Result<(), ReverbError> {
        let need_right = layout.is_stereo() && self.right.is_none();
        if self.left.is_some() && !need_right {
            return Ok(());
        }

        let rate = self.sample_rate.unwrap_or(sample_rate);
        let lengths = tap_lengths(rate);
        if lengths[0] == 0 {
            return Err(ReverbError::SampleRateTooLow { sample_rate: rate });
        }

        let left = match self.left {
            Some(_) => None,
            None => Some(TapBank::try_new(lengths)?),
        };
        let right = if need_right {
            Some(TapBank::try_new(lengths)?)
        } else {
            None
        };

        if left.is_some() {
            self.left = left;
        }
        if right.is_some() {
            self.right = right;
        }
        self.sample_rate = Some(rate);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = rate,
            stereo = self.right.is_some(),
            "reverb delay lines allocated"
        );
        Ok(())
    }

    /// Free all delay lines and reset the cursor. Idempotent.
    pub fn release(&mut self) {
        #[cfg(feature = "tracing")]
        if self.left.is_some() {
            tracing::debug!("reverb delay lines released");
        }
        self.left = None;
        self.right = None;
        self.sample_rate = None;
        self.cursor = 0;
    }

    /// Whether any delay lines are held.
    pub fn is_allocated(&self) -> bool {
        self.left.is_some()
    }

    /// Whether the right-channel taps are held.
    pub fn is_stereo_allocated(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Sample rate the current delay lines were sized for.
    pub fn allocated_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Lengths of the allocated taps.
    pub fn allocated_lengths(&self) -> Option<[usize; TAP_COUNT]> {
        self.left
            .as_ref()
            .map(|bank| core::array::from_fn(|n| bank.taps[n].len()))
    }

    /// Rolling write cursor shared by every tap.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Whether every held delay line is zero. True when unallocated.
    pub fn is_silent(&self) -> bool {
        self.left.as_ref().is_none_or(TapBank::is_silent)
            && self.right.as_ref().is_none_or(TapBank::is_silent)
    }

    /// Apply the echo to the first `frames` samples of a mono block.
    ///
    /// `amount` above [`MAX_AMOUNT`] behaves as [`MAX_AMOUNT`]. Advances the
    /// cursor by the number of samples processed. Does nothing when the
    /// delay lines are not allocated.
    pub fn process_mono(&mut self, buffer: &mut [i32], frames: usize, amount: u8) {
        let Some(bank) = self.left.as_mut() else {
            return;
        };
        let pct = feedback_pct(ChannelLayout::Mono, amount);
        let frames = frames.min(buffer.len());

        let mut cursor = self.cursor;
        let mut loc = bank.locations(cursor);
        for sample in &mut buffer[..frames] {
            bank.feed(&loc, *sample >> 3, pct);

            cursor = cursor.wrapping_add(1);
            loc = bank.locations(cursor);

            *sample = sample.wrapping_add(bank.echo(&loc));
        }
        self.cursor = cursor;
    }

    /// Apply the echo to the first `frames` interleaved stereo frames.
    ///
    /// Left and right keep separate taps but share the cursor. Does nothing
    /// unless stereo delay lines are allocated.
    pub fn process_stereo(&mut self, buffer: &mut [i32], frames: usize, amount: u8) {
        let (Some(left), Some(right)) = (self.left.as_mut(), self.right.as_mut()) else {
            return;
        };
        let pct = feedback_pct(ChannelLayout::Stereo, amount);
        let frames = frames.min(buffer.len() / 2);

        let mut cursor = self.cursor;
        let mut loc = left.locations(cursor);
        for frame in buffer[..frames * 2].chunks_exact_mut(2) {
            left.feed(&loc, frame[0] >> 3, pct);
            right.feed(&loc, frame[1] >> 3, pct);

            cursor = cursor.wrapping_add(1);
            loc = left.locations(cursor);

            frame[0] = frame[0].wrapping_add(left.echo(&loc));
            frame[1] = frame[1].wrapping_add(right.echo(&loc));
        }
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(rate: u32) -> Reverb {
        let mut r = Reverb::new();
        r.ensure_allocated(rate, ChannelLayout::Mono).unwrap();
        r
    }

    #[test]
    fn test_tap_lengths_44k() {
        assert_eq!(
            tap_lengths(44100),
            [2004, 2035, 2130, 2286, 2505, 2787, 3132, 3539]
        );
    }

    #[test]
    fn test_tap_lengths_48k() {
        // 5000 * 48000 / 110000 = 2181.8
        assert_eq!(tap_lengths(48000)[0], 2181);
        assert_eq!(tap_lengths(48000)[7], 3852);
    }

    #[test]
    fn test_tap_lengths_no_overflow_at_high_rates() {
        let lengths = tap_lengths(u32::MAX);
        assert!(lengths.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_feedback_pct() {
        assert_eq!(feedback_pct(ChannelLayout::Mono, 0), 58);
        assert_eq!(feedback_pct(ChannelLayout::Mono, 15), 118);
        assert_eq!(feedback_pct(ChannelLayout::Stereo, 0), 63);
        assert_eq!(feedback_pct(ChannelLayout::Stereo, 15), 123);
        assert_eq!(feedback_pct(ChannelLayout::Stereo, 200), 123);
    }

    #[test]
    fn test_new_is_unallocated() {
        let r = Reverb::new();
        assert!(!r.is_allocated());
        assert_eq!(r.allocated_rate(), None);
        assert_eq!(r.cursor(), 0);
        assert!(r.is_silent());
    }

    #[test]
    fn test_unallocated_process_is_noop() {
        let mut r = Reverb::new();
        let mut buf = [100, 200, 300];
        r.process_mono(&mut buf, 3, 8);
        r.process_stereo(&mut buf, 1, 8);
        assert_eq!(buf, [100, 200, 300]);
        assert_eq!(r.cursor(), 0);
    }

    #[test]
    fn test_mono_allocation_then_stereo_upgrade() {
        let mut r = mono(44100);
        assert!(r.is_allocated());
        assert!(!r.is_stereo_allocated());

        let mut buf = [0i32; 4];
        r.process_stereo(&mut buf, 2, 8);
        assert_eq!(r.cursor(), 0, "stereo needs right taps");

        r.ensure_allocated(44100, ChannelLayout::Stereo).unwrap();
        assert!(r.is_stereo_allocated());
    }

    #[test]
    fn test_ensure_allocated_is_idempotent_and_keyed_to_first_rate() {
        let mut r = mono(44100);
        r.ensure_allocated(48000, ChannelLayout::Stereo).unwrap();
        assert_eq!(r.allocated_rate(), Some(44100));
        assert_eq!(r.allocated_lengths(), Some(tap_lengths(44100)));
    }

    #[test]
    fn test_low_sample_rate_rejected() {
        let mut r = Reverb::new();
        assert_eq!(
            r.ensure_allocated(21, ChannelLayout::Mono),
            Err(ReverbError::SampleRateTooLow { sample_rate: 21 })
        );
        assert!(!r.is_allocated());
        assert!(r.ensure_allocated(22, ChannelLayout::Mono).is_ok());
        assert_eq!(r.allocated_lengths().unwrap()[0], 1);
    }

    #[test]
    fn test_release_resets_cursor() {
        let mut r = mono(8000);
        let mut buf = [1000i32; 64];
        r.process_mono(&mut buf, 64, 4);
        assert_eq!(r.cursor(), 64);
        r.release();
        assert!(!r.is_allocated());
        assert_eq!(r.cursor(), 0);
        r.release();
    }

    #[test]
    fn test_cursor_advances_by_frames() {
        let mut r = Reverb::new();
        r.ensure_allocated(8000, ChannelLayout::Stereo).unwrap();
        let mut buf = [0i32; 200];
        r.process_stereo(&mut buf, 60, 3);
        assert_eq!(r.cursor(), 60);
        r.process_mono(&mut buf, 25, 3);
        assert_eq!(r.cursor(), 85);
    }

    #[test]
    fn test_frames_bounded_by_buffer() {
        let mut r = mono(8000);
        let mut buf = [0i32; 10];
        r.process_mono(&mut buf, 1000, 3);
        assert_eq!(r.cursor(), 10);
    }

    #[test]
    fn test_mono_first_echo() {
        let mut r = mono(44100);
        let mut buf = vec![0i32; 4096];
        buf[0] = 10_000;
        r.process_mono(&mut buf, 4096, 8);

        assert_eq!(buf[0], 10_000);
        assert!(buf[1..2003].iter().all(|&s| s == 0));
        assert_eq!(buf[2003], 1250);
        assert_eq!(buf[2034], -1250);
    }

    #[test]
    fn test_stereo_channels_are_independent() {
        let mut r = Reverb::new();
        r.ensure_allocated(44100, ChannelLayout::Stereo).unwrap();
        let mut buf = vec![0i32; 8192];
        buf[0] = 8000;
        r.process_stereo(&mut buf, 4096, 0);

        assert_eq!(buf[2 * 2003], 1000);
        assert_eq!(buf[2 * 2003 + 1], 0);
        assert!(buf.iter().skip(1).step_by(2).all(|&s| s == 0));
    }

    #[test]
    fn test_error_display() {
        let e = ReverbError::SampleRateTooLow { sample_rate: 10 };
        assert!(e.to_string().contains("10 Hz"));
        let e = ReverbError::from(TapLineError::OutOfMemory { slots: 4 });
        assert!(e.to_string().contains("allocation"));
    }
}
