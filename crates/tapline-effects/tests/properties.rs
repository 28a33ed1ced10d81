//! Property-based tests for the reverb.

use proptest::prelude::*;
use tapline_core::ChannelLayout;
use tapline_effects::{Reverb, feedback_pct, tap_lengths};

fn allocated(rate: u32, layout: ChannelLayout) -> Reverb {
    let mut r = Reverb::new();
    r.ensure_allocated(rate, layout).unwrap();
    r
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn silence_in_silence_out(
        rate in 22u32..96_000,
        amount in any::<u8>(),
        stereo in any::<bool>(),
        blocks in 1usize..8,
    ) {
        let layout = ChannelLayout::from_stereo(stereo);
        let mut r = allocated(rate, layout);
        let mut buf = vec![0i32; 1024];
        for _ in 0..blocks {
            match layout {
                ChannelLayout::Mono => r.process_mono(&mut buf, 1024, amount),
                ChannelLayout::Stereo => r.process_stereo(&mut buf, 512, amount),
            }
            prop_assert!(buf.iter().all(|&s| s == 0), "zero input produced output");
        }
        prop_assert!(r.is_silent());
    }

    #[test]
    fn amounts_above_fifteen_behave_as_fifteen(
        amount in 16u8..=255,
        stereo in any::<bool>(),
        seed in proptest::collection::vec(-32768i32..32768, 256),
    ) {
        let layout = ChannelLayout::from_stereo(stereo);
        let mut a = allocated(8000, layout);
        let mut b = allocated(8000, layout);

        let mut x: Vec<i32> = seed.iter().cycle().take(4096).copied().collect();
        let mut y = x.clone();
        match layout {
            ChannelLayout::Mono => {
                a.process_mono(&mut x, 4096, amount);
                b.process_mono(&mut y, 4096, 15);
            }
            ChannelLayout::Stereo => {
                a.process_stereo(&mut x, 2048, amount);
                b.process_stereo(&mut y, 2048, 15);
            }
        }
        prop_assert_eq!(x, y);
    }

    #[test]
    fn tap_lengths_truncate(rate in 0u32..400_000) {
        let lengths = tap_lengths(rate);
        let bases = [5000u64, 5078, 5313, 5703, 6250, 6953, 7813, 8828];
        for (len, base) in lengths.iter().zip(bases) {
            prop_assert_eq!(*len as u64, base * u64::from(rate) / 110_000);
        }
    }
}

#[test]
fn stereo_coefficient_exceeds_mono_by_five() {
    for rev in 0..=15u8 {
        assert_eq!(
            feedback_pct(ChannelLayout::Stereo, rev) - feedback_pct(ChannelLayout::Mono, rev),
            5,
            "rev {}",
            rev
        );
    }
}

#[test]
fn coefficient_asymmetry_shows_in_decay() {
    // Second trip through tap 1 decays the 1/8 input by pct / 128.
    let rate = 44100;
    let first = tap_lengths(rate)[0];
    for rev in [0u8, 7, 15] {
        let mut mono = allocated(rate, ChannelLayout::Mono);
        let mut m = vec![0i32; 2 * first + 1];
        m[0] = 12_800;
        let frames = m.len();
        mono.process_mono(&mut m, frames, rev);

        let mut stereo = allocated(rate, ChannelLayout::Stereo);
        let mut s = vec![0i32; 2 * (2 * first + 1)];
        s[0] = 12_800;
        stereo.process_stereo(&mut s, 2 * first + 1, rev);

        let mono_pct = feedback_pct(ChannelLayout::Mono, rev);
        let stereo_pct = feedback_pct(ChannelLayout::Stereo, rev);
        assert_eq!(m[2 * first - 1], (mono_pct * 1600) >> 7);
        assert_eq!(s[2 * (2 * first - 1)], (stereo_pct * 1600) >> 7);
    }
}
