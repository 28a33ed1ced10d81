//! Tapline Effects - accumulator-domain effects built on tapline-core
//!
//! - [`Reverb`] - Eight-tap integer feedback echo (mono and stereo)
//! - [`ReverbStage`] - Per-block control around [`Reverb`]: lazy
//!   allocation, release on zero amount, amount clamping, bypass on failure
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tapline_core::{ChannelLayout, DspStage, SharedParam};
//! use tapline_effects::{ReverbStage, reverb_amount_param};
//!
//! let amount = Arc::new(reverb_amount_param());
//! let mut stage = ReverbStage::new(44100, Arc::clone(&amount));
//!
//! amount.set(8);
//! let mut block = vec![0i32; 1024];
//! block[0] = 10_000;
//! stage.process(&mut block, 512, ChannelLayout::Stereo);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod control;
pub mod reverb;

pub use control::{RatePolicy, ReverbStage, reverb_amount_param};
pub use reverb::{
    MAX_AMOUNT, MONO_FEEDBACK_BASE, REVERBERATION, Reverb, ReverbError, STEREO_FEEDBACK_BASE,
    TAP_BASES, TAP_COUNT, feedback_pct, tap_lengths,
};
