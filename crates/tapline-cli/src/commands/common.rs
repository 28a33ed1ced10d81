//! Helpers shared by `play` and `render`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use tapline_config::{PlayerSettings, settings_path};
use tapline_core::{SampleSource, ToneSource};
use tapline_io::WavSource;

/// Peak level of the built-in test tone.
const TONE_AMPLITUDE: i16 = 8000;

/// Where the audio comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Input WAV file
    #[arg(value_name = "FILE", conflicts_with = "tone")]
    pub file: Option<PathBuf>,

    /// Use a gated sine tone instead of a file
    #[arg(long)]
    pub tone: bool,

    /// Tone frequency in Hz
    #[arg(long, default_value = "440", requires = "tone")]
    pub frequency: f32,

    /// Tone burst length in milliseconds
    #[arg(long, default_value = "120", requires = "tone")]
    pub burst_ms: u32,

    /// Silence between tone bursts in milliseconds
    #[arg(long, default_value = "600", requires = "tone")]
    pub gap_ms: u32,
}

/// Overrides applied on top of the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Reverb amount (0 = off, 1-15)
    #[arg(short, long, value_name = "N")]
    pub reverb: Option<u8>,

    /// Output sample rate in Hz (defaults to the file's rate)
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
}

/// A loaded source plus the rate it should run at.
pub struct OpenedSource {
    /// Boxed source for the mixer.
    pub source: Box<dyn SampleSource>,
    /// Output rate in Hz.
    pub sample_rate: u32,
    /// Frames until the source runs dry, if it ever does.
    pub frames: Option<u64>,
}

/// Load the settings file from `config` or the platform location.
pub fn load_settings(config: Option<&Path>) -> Result<(PlayerSettings, PathBuf)> {
    let path = match config {
        Some(p) => p.to_path_buf(),
        None => settings_path(),
    };
    let settings = PlayerSettings::load_or_default(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    Ok((settings, path))
}

/// Apply command-line overrides and re-check the result.
pub fn apply_tuning(settings: &mut PlayerSettings, tuning: &TuningArgs) -> Result<()> {
    if let Some(amount) = tuning.reverb {
        if amount > tapline_effects::MAX_AMOUNT {
            tracing::warn!(amount, "reverb amount above 15 behaves like 15");
        }
        settings.reverb.amount = amount;
    }
    if let Some(rate) = tuning.sample_rate {
        settings.output.sample_rate = rate;
    }
    settings.validate()?;
    Ok(())
}

/// Open the requested source.
///
/// A file sets the output rate unless one was given explicitly.
pub fn open_source(
    args: &SourceArgs,
    settings: &mut PlayerSettings,
    tuning: &TuningArgs,
    looping: bool,
) -> Result<OpenedSource> {
    if let Some(path) = &args.file {
        let source = WavSource::open(path)
            .with_context(|| format!("opening {}", path.display()))?
            .looping(looping);
        if tuning.sample_rate.is_none() {
            settings.output.sample_rate = source.sample_rate();
        }
        if source.sample_rate() != settings.output.sample_rate {
            tracing::warn!(
                file_rate = source.sample_rate(),
                output_rate = settings.output.sample_rate,
                "file plays at the output rate without resampling"
            );
        }
        let frames = (!looping).then_some(source.len_frames() as u64);
        return Ok(OpenedSource {
            sample_rate: settings.output.sample_rate,
            frames,
            source: Box::new(source),
        });
    }

    if !args.tone {
        bail!("give a WAV file or --tone");
    }
    let rate = settings.output.sample_rate;
    let tone =
        ToneSource::new(rate, args.frequency, TONE_AMPLITUDE).with_gating(args.burst_ms, args.gap_ms);
    Ok(OpenedSource {
        source: Box::new(tone),
        sample_rate: rate,
        frames: None,
    })
}

/// Frames covering `seconds` at `sample_rate`.
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    (seconds.max(0.0) * f64::from(sample_rate)).round() as u64
}
