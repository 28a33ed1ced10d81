//! Scenario tests pinning the echo pattern of the reverb.
//!
//! With feedback write at `cursor % L` and read at `(cursor + 1) % L`, an
//! impulse at index 0 reappears at index `L - 1` for each tap of length `L`.

use std::sync::Arc;

use tapline_core::{ChannelLayout, DspStage};
use tapline_effects::{Reverb, ReverbStage, reverb_amount_param, tap_lengths};

const RATE: u32 = 44100;

fn mono_impulse_response(len: usize, amount: u8, block: usize) -> Vec<i32> {
    let mut reverb = Reverb::new();
    reverb.ensure_allocated(RATE, ChannelLayout::Mono).unwrap();
    let mut buf = vec![0i32; len];
    buf[0] = 10_000;
    for chunk in buf.chunks_mut(block) {
        let n = chunk.len();
        reverb.process_mono(chunk, n, amount);
    }
    buf
}

#[test]
fn impulse_reappears_once_per_tap_with_alternating_sign() {
    let out = mono_impulse_response(4096, 8, 4096);
    let lengths = tap_lengths(RATE);

    assert_eq!(out[0], 10_000);
    for (n, &len) in lengths.iter().enumerate() {
        let expected = if n % 2 == 0 { 1250 } else { -1250 };
        assert_eq!(out[len - 1], expected, "tap {} at index {}", n + 1, len - 1);
    }

    let echo_indices: Vec<usize> = lengths.iter().map(|l| l - 1).collect();
    for (i, &s) in out.iter().enumerate().take(4000).skip(1) {
        if !echo_indices.contains(&i) {
            assert_eq!(s, 0, "unexpected energy at {}", i);
        }
    }
}

#[test]
fn second_trip_through_first_tap_is_decayed() {
    // pct = 58 + 4 * 8 = 90; (90 * 1250) >> 7 = 878
    let out = mono_impulse_response(4096, 8, 4096);
    assert_eq!(out[2 * 2004 - 1], 878);
}

#[test]
fn block_size_does_not_change_output() {
    let whole = mono_impulse_response(8192, 8, 8192);
    let blocked = mono_impulse_response(8192, 8, 512);
    let ragged = mono_impulse_response(8192, 8, 37);
    assert_eq!(whole, blocked);
    assert_eq!(whole, ragged);
}

#[test]
fn stereo_uses_stronger_feedback() {
    // Stereo pct at amount 8 is 95: (95 * 1250) >> 7 = 927
    let mut reverb = Reverb::new();
    reverb.ensure_allocated(RATE, ChannelLayout::Stereo).unwrap();
    let mut buf = vec![0i32; 2 * 4096];
    buf[1] = 10_000;
    reverb.process_stereo(&mut buf, 4096, 8);

    assert_eq!(buf[2 * 2003 + 1], 1250);
    assert_eq!(buf[2 * (2 * 2004 - 1) + 1], 927);
    assert_eq!(buf[2 * 2003], 0);
}

#[test]
fn stage_dsp_entry_matches_direct_processing() {
    let amount = Arc::new(reverb_amount_param());
    let mut stage = ReverbStage::new(RATE, Arc::clone(&amount));
    let mut buf = vec![0i32; 4096];
    buf[0] = 10_000;
    for chunk in buf.chunks_mut(512) {
        let n = chunk.len();
        stage.dsp(chunk, n, false, 8);
    }
    assert_eq!(buf, mono_impulse_response(4096, 8, 4096));
}

#[test]
fn re_enabled_reverb_starts_from_silence() {
    let amount = Arc::new(reverb_amount_param());
    let mut stage = ReverbStage::new(RATE, Arc::clone(&amount));

    amount.set(12);
    let mut loud = vec![20_000i32; 2 * 3000];
    stage.process(&mut loud, 3000, ChannelLayout::Stereo);
    assert!(!stage.reverb().is_silent());

    amount.set(0);
    let mut dry = vec![0i32; 2 * 64];
    stage.process(&mut dry, 64, ChannelLayout::Stereo);
    assert!(!stage.reverb().is_allocated());

    amount.set(12);
    let mut quiet = vec![0i32; 2 * 8000];
    stage.process(&mut quiet, 8000, ChannelLayout::Stereo);
    assert!(quiet.iter().all(|&s| s == 0), "stale echo leaked after re-enable");
    assert!(stage.reverb().is_silent());
}
