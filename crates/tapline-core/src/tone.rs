//! Gated sine test source.

use core::f32::consts::TAU;

use crate::dsp::ChannelLayout;
use crate::mixer::SampleSource;

/// Sine bursts separated by silence.
///
/// Each period is `burst_ms` of tone followed by `gap_ms` of silence, which
/// leaves room to hear an echo tail decay. A gap of zero gives a steady tone.
/// Stereo output duplicates the sample on both channels.
#[derive(Debug, Clone)]
pub struct ToneSource {
    sample_rate: u32,
    frequency: f32,
    amplitude: i16,
    burst_ms: u32,
    gap_ms: u32,
    phase: f32,
    frame_in_period: u32,
    remaining_frames: Option<u64>,
}

impl ToneSource {
    /// Steady tone at `frequency` Hz with peak `amplitude`.
    pub fn new(sample_rate: u32, frequency: f32, amplitude: i16) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            frequency,
            amplitude,
            burst_ms: 1000,
            gap_ms: 0,
            phase: 0.0,
            frame_in_period: 0,
            remaining_frames: None,
        }
    }

    /// Switch to bursts of `burst_ms` followed by `gap_ms` of silence.
    pub fn with_gating(mut self, burst_ms: u32, gap_ms: u32) -> Self {
        self.burst_ms = burst_ms.max(1);
        self.gap_ms = gap_ms;
        self
    }

    /// Stop producing sound after `frames` frames.
    pub fn with_length(mut self, frames: u64) -> Self {
        self.remaining_frames = Some(frames);
        self
    }

    fn ms_to_frames(&self, ms: u32) -> u32 {
        ((u64::from(ms) * u64::from(self.sample_rate)) / 1000) as u32
    }

    fn next_sample(&mut self) -> i32 {
        if let Some(remaining) = self.remaining_frames.as_mut() {
            if *remaining == 0 {
                return 0;
            }
            *remaining -= 1;
        }

        let burst = self.ms_to_frames(self.burst_ms).max(1);
        let period = burst + self.ms_to_frames(self.gap_ms);
        let gate_open = self.frame_in_period < burst;
        self.frame_in_period = (self.frame_in_period + 1) % period;

        let value = libm::sinf(self.phase * TAU) * f32::from(self.amplitude);
        self.phase += self.frequency / self.sample_rate as f32;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        if gate_open {
            libm::roundf(value) as i32
        } else {
            0
        }
    }
}

impl SampleSource for ToneSource {
    fn accumulate(&mut self, acc: &mut [i32], layout: ChannelLayout) {
        for frame in acc.chunks_exact_mut(layout.channels()) {
            let s = self.next_sample();
            for slot in frame.iter_mut() {
                *slot += s;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.frame_in_period = 0;
    }

    fn is_finished(&self) -> bool {
        self.remaining_frames == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_bounded_by_amplitude() {
        let mut tone = ToneSource::new(8000, 440.0, 1000);
        let mut acc = [0i32; 800];
        tone.accumulate(&mut acc, ChannelLayout::Mono);
        let peak = acc.iter().map(|s| s.abs()).max().unwrap();
        assert!(peak <= 1000);
        assert!(peak > 900, "peak {peak}");
    }

    #[test]
    fn test_stereo_duplicates_channels() {
        let mut tone = ToneSource::new(8000, 300.0, 5000);
        let mut acc = [0i32; 64];
        tone.accumulate(&mut acc, ChannelLayout::Stereo);
        for frame in acc.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_gating_inserts_silence() {
        // 10 ms bursts, 10 ms gaps at 1 kHz: 10 frames on, 10 off.
        let mut tone = ToneSource::new(1000, 125.0, 8000).with_gating(10, 10);
        let mut acc = [0i32; 40];
        tone.accumulate(&mut acc, ChannelLayout::Mono);
        assert!(acc[10..20].iter().all(|&s| s == 0));
        assert!(acc[30..40].iter().all(|&s| s == 0));
        assert!(acc[0..10].iter().any(|&s| s != 0));
    }

    #[test]
    fn test_length_limit() {
        let mut tone = ToneSource::new(1000, 125.0, 8000).with_length(5);
        let mut acc = [0i32; 20];
        tone.accumulate(&mut acc, ChannelLayout::Stereo);
        assert!(tone.is_finished());
        assert!(acc[10..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_accumulates_rather_than_overwrites() {
        let mut tone = ToneSource::new(1000, 125.0, 0);
        let mut acc = [7i32; 4];
        tone.accumulate(&mut acc, ChannelLayout::Mono);
        assert_eq!(acc, [7; 4]);
    }
}
