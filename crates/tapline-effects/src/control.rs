//! Per-block reverb control.
//!
//! [`ReverbStage`] owns a [`Reverb`] and decides, once per block, what the
//! delay lines should be doing:
//!
//! - amount `0`: release the delay lines. Turning reverb off cuts the tail
//!   immediately and turning it back on starts from silence.
//! - amount `1..=255`: clamp to [`MAX_AMOUNT`], allocate on first use, then
//!   run the mono or stereo path.
//! - allocation failure: leave the block dry and try again next block.
//!
//! The amount is read from a [`SharedParam`] that a control thread may write
//! at any time. The read is relaxed; a change lands on the next block.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;

use tapline_core::{ChannelLayout, DspStage, SharedParam};

use crate::reverb::{MAX_AMOUNT, Reverb};

/// Build the shared reverb amount parameter: default off, range `0..=255`.
///
/// Values above [`MAX_AMOUNT`] are accepted and behave as [`MAX_AMOUNT`].
pub fn reverb_amount_param() -> SharedParam {
    SharedParam::new(0, 0, i32::from(u8::MAX))
}

/// What happens to allocated delay lines when the output rate changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatePolicy {
    /// Free the delay lines so the next block re-sizes them for the new rate.
    #[default]
    Reallocate,
    /// Keep the delay lines sized for the rate they were allocated at.
    Keep,
}

/// Reverb with lazy allocation and release-on-zero.
pub struct ReverbStage {
    reverb: Reverb,
    amount: Arc<SharedParam>,
    sample_rate: u32,
    policy: RatePolicy,
    bypassed: bool,
}

impl ReverbStage {
    /// Create a stage for `sample_rate` reading its amount from `amount`.
    ///
    /// Nothing is allocated until a block arrives with a nonzero amount.
    pub fn new(sample_rate: u32, amount: Arc<SharedParam>) -> Self {
        Self {
            reverb: Reverb::new(),
            amount,
            sample_rate,
            policy: RatePolicy::default(),
            bypassed: false,
        }
    }

    /// Choose how rate changes affect allocated delay lines.
    pub fn with_policy(mut self, policy: RatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current rate-change policy.
    pub fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// Rate used for the next allocation.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The wrapped reverb.
    pub fn reverb(&self) -> &Reverb {
        &self.reverb
    }

    /// Shared amount parameter.
    pub fn amount(&self) -> &Arc<SharedParam> {
        &self.amount
    }

    /// Whether the last nonzero-amount block was left dry because the delay
    /// lines could not be allocated.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Host-facing entry point: process `frames` frames at `amount`.
    pub fn dsp(&mut self, buffer: &mut [i32], frames: usize, is_stereo: bool, amount: u8) {
        if amount == 0 {
            self.reverb.release();
            self.bypassed = false;
            return;
        }
        let amount = amount.min(MAX_AMOUNT);
        let layout = ChannelLayout::from_stereo(is_stereo);

        if let Err(_err) = self.reverb.ensure_allocated(self.sample_rate, layout) {
            if !self.bypassed {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "reverb bypassed");
                self.bypassed = true;
            }
            return;
        }
        self.bypassed = false;

        match layout {
            ChannelLayout::Mono => self.reverb.process_mono(buffer, frames, amount),
            ChannelLayout::Stereo => self.reverb.process_stereo(buffer, frames, amount),
        }
    }
}

impl DspStage for ReverbStage {
    fn process(&mut self, buffer: &mut [i32], frames: usize, layout: ChannelLayout) {
        let amount = self.amount.get().clamp(0, i32::from(u8::MAX)) as u8;
        self.dsp(buffer, frames, layout.is_stereo(), amount);
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        if sample_rate == self.sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        if self.policy == RatePolicy::Reallocate && self.reverb.is_allocated() {
            #[cfg(feature = "tracing")]
            tracing::debug!(sample_rate, "reverb re-sized for new rate");
            self.reverb.release();
        }
    }

    fn reset(&mut self) {
        self.reverb.release();
        self.bypassed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(rate: u32) -> (ReverbStage, Arc<SharedParam>) {
        let amount = Arc::new(reverb_amount_param());
        (ReverbStage::new(rate, Arc::clone(&amount)), amount)
    }

    #[test]
    fn test_zero_amount_never_allocates() {
        let (mut s, _) = stage(44100);
        let mut buf = [500i32; 64];
        s.process(&mut buf, 32, ChannelLayout::Stereo);
        assert!(!s.reverb().is_allocated());
        assert_eq!(buf, [500; 64]);
    }

    #[test]
    fn test_nonzero_allocates_lazily() {
        let (mut s, amount) = stage(44100);
        assert!(!s.reverb().is_allocated());
        amount.set(3);
        let mut buf = [0i32; 64];
        s.process(&mut buf, 32, ChannelLayout::Stereo);
        assert!(s.reverb().is_stereo_allocated());
        assert_eq!(s.reverb().cursor(), 32);
    }

    #[test]
    fn test_back_to_zero_releases() {
        let (mut s, amount) = stage(8000);
        amount.set(5);
        let mut buf = [1000i32; 64];
        s.process(&mut buf, 64, ChannelLayout::Mono);
        amount.set(0);
        s.process(&mut buf, 64, ChannelLayout::Mono);
        assert!(!s.reverb().is_allocated());
        assert_eq!(s.reverb().cursor(), 0);
    }

    #[test]
    fn test_dsp_clamps_amount() {
        let (mut a, _) = stage(8000);
        let (mut b, _) = stage(8000);
        let mut x: Vec<i32> = (0..512).map(|i| (i * 37 % 2000) - 1000).collect();
        let mut y = x.clone();
        a.dsp(&mut x, 512, false, 200);
        b.dsp(&mut y, 512, false, 15);
        assert_eq!(x, y);
    }

    #[test]
    fn test_unusable_rate_bypasses() {
        let (mut s, amount) = stage(10);
        amount.set(8);
        let mut buf = [1234i32; 16];
        s.process(&mut buf, 16, ChannelLayout::Mono);
        assert!(s.is_bypassed());
        assert_eq!(buf, [1234; 16]);

        s.set_sample_rate(8000);
        s.process(&mut buf, 16, ChannelLayout::Mono);
        assert!(!s.is_bypassed());
        assert!(s.reverb().is_allocated());
    }

    #[test]
    fn test_rate_change_reallocates_by_default() {
        let (mut s, amount) = stage(44100);
        amount.set(4);
        let mut buf = [0i32; 32];
        s.process(&mut buf, 16, ChannelLayout::Stereo);
        assert_eq!(s.reverb().allocated_rate(), Some(44100));

        s.set_sample_rate(48000);
        assert!(!s.reverb().is_allocated());
        s.process(&mut buf, 16, ChannelLayout::Stereo);
        assert_eq!(s.reverb().allocated_rate(), Some(48000));
    }

    #[test]
    fn test_rate_change_kept_under_keep_policy() {
        let (s, amount) = stage(44100);
        let mut s = s.with_policy(RatePolicy::Keep);
        amount.set(4);
        let mut buf = [0i32; 32];
        s.process(&mut buf, 16, ChannelLayout::Stereo);

        s.set_sample_rate(48000);
        s.process(&mut buf, 16, ChannelLayout::Stereo);
        assert_eq!(s.reverb().allocated_rate(), Some(44100));
        assert_eq!(s.sample_rate(), 48000);
    }

    #[test]
    fn test_reset_releases() {
        let (mut s, amount) = stage(8000);
        amount.set(1);
        let mut buf = [0i32; 8];
        s.process(&mut buf, 8, ChannelLayout::Mono);
        s.reset();
        assert!(!s.reverb().is_allocated());
    }
}
