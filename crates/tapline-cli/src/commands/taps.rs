//! Taps command: print the reverb's delay-line layout.

use anyhow::{Result, bail};
use clap::Args;
use tapline_effects::{MONO_FEEDBACK_BASE, STEREO_FEEDBACK_BASE, TAP_BASES, tap_lengths};

#[derive(Args)]
pub struct TapsArgs {
    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value = "44100")]
    sample_rate: u32,
}

pub fn run(args: TapsArgs) -> Result<()> {
    let lengths = tap_lengths(args.sample_rate);
    if lengths.contains(&0) {
        bail!("{} Hz is too low for the reverb", args.sample_rate);
    }

    let rate = f64::from(args.sample_rate);
    println!("Reverb taps at {} Hz", args.sample_rate);
    println!("=========================");
    for (i, (&len, &base)) in lengths.iter().zip(TAP_BASES.iter()).enumerate() {
        let sign = if i % 2 == 0 { '+' } else { '-' };
        println!(
            "  {} tap {}: {:>6} samples ({:>6.2} ms, base {})",
            sign,
            i + 1,
            len,
            len as f64 * 1000.0 / rate,
            base
        );
    }
    println!();
    println!(
        "Feedback: mono {}/128, stereo {}/128, plus 4/128 per amount step",
        MONO_FEEDBACK_BASE, STEREO_FEEDBACK_BASE
    );

    Ok(())
}
