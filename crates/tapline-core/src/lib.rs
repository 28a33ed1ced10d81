//! Tapline Core - integer PCM primitives for a real-time playback pipeline
//!
//! This crate holds the pieces that sit between a sample source and an audio
//! device callback, all operating on integer PCM with no allocation once
//! prepared.
//!
//! # Core Abstractions
//!
//! ## Buffers
//!
//! Mixing happens in a 32-bit signed accumulator (`i32`), either mono or
//! interleaved stereo (`[L0, R0, L1, R1, ...]`). Output leaves the mixer as
//! saturated 16-bit PCM.
//!
//! - [`ChannelLayout`] - Mono or interleaved stereo
//! - [`clip16`] - Saturating accumulator-to-`i16` conversion
//!
//! ## Processing
//!
//! - [`DspStage`] - In-place processor over an accumulator block
//! - [`SampleSource`] - Anything that adds samples into an accumulator
//! - [`Mixer`] - Fills a 16-bit output block (the device-facing contract)
//! - [`DspMixer`] - Source, stage, clip: the standard [`Mixer`]
//!
//! ## Delay Lines
//!
//! - [`TapLine`] - Fixed-length integer feedback comb slot buffer
//!
//! ## Shared Parameters
//!
//! - [`SharedParam`] - Relaxed atomic integer written by a control thread
//!   and read by the audio thread
//!
//! ## Sources
//!
//! - [`ToneSource`] - Gated sine bursts, handy for hearing echo tails
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the crate on targets with only
//! `alloc`:
//!
//! ```toml
//! [dependencies]
//! tapline-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tapline_core::{ChannelLayout, DspMixer, Mixer, ToneSource};
//!
//! let tone = ToneSource::new(44100, 440.0, 8000);
//! let mut mixer = DspMixer::new(tone, (), ChannelLayout::Stereo, 1024);
//!
//! let mut block = [0i16; 512];
//! mixer.mix(&mut block);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod dsp;
pub mod mixer;
pub mod param;
pub mod tap_line;
pub mod tone;

pub use dsp::{ChannelLayout, DspStage, clip16};
pub use mixer::{DspMixer, Mixer, SampleSource};
pub use param::SharedParam;
pub use tap_line::{TapLine, TapLineError};
pub use tone::ToneSource;
