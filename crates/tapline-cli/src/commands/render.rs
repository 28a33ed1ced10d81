//! Render command: offline processing to a WAV file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tapline_config::{PlayerSettings, SharedSettings};
use tapline_core::{ChannelLayout, DspMixer};
use tapline_effects::ReverbStage;
use tapline_io::record_to_wav;

use super::common::{self, OpenedSource, SourceArgs, TuningArgs};

/// Length of a rendered tone when none is given.
pub const DEFAULT_TONE_SECS: f64 = 5.0;
/// Silence rendered after a file so the reverb tail is kept.
const TAIL_SECS: f64 = 2.0;
/// Frames the disk saver pulls per block.
const RENDER_CHUNK_FRAMES: usize = 1024;

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Output WAV file (defaults to the disk saver path)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Length in seconds (defaults to the file plus a reverb tail)
    #[arg(short, long, value_name = "S")]
    seconds: Option<f64>,

    /// Write 32-bit float samples instead of 16-bit PCM
    #[arg(long)]
    float: bool,
}

pub fn run(args: RenderArgs, config: Option<PathBuf>) -> Result<()> {
    let (mut settings, _) = common::load_settings(config.as_deref())?;
    common::apply_tuning(&mut settings, &args.tuning)?;
    if args.float {
        settings.disk_saver.bits_per_sample = 32;
    }

    let opened = common::open_source(&args.source, &mut settings, &args.tuning, false)?;
    let seconds = args.seconds.unwrap_or(match opened.frames {
        Some(n) => n as f64 / f64::from(opened.sample_rate) + TAIL_SECS,
        None => DEFAULT_TONE_SECS,
    });
    let path = args
        .output
        .unwrap_or_else(|| settings.disk_saver.path.clone());

    render_to_file(opened, &settings, &path, seconds)
}

/// Run `opened` through the reverb into `path` for `seconds`.
pub fn render_to_file(
    opened: OpenedSource,
    settings: &PlayerSettings,
    path: &Path,
    seconds: f64,
) -> Result<()> {
    let live = SharedSettings::from_settings(settings);
    let stage = ReverbStage::new(opened.sample_rate, Arc::clone(live.reverb()))
        .with_policy(settings.reverb.rate_policy());
    let mut mixer = DspMixer::new(
        opened.source,
        stage,
        ChannelLayout::Stereo,
        RENDER_CHUNK_FRAMES * 2,
    );

    let mut format = settings.disk_format();
    format.sample_rate = opened.sample_rate;
    let frames = common::seconds_to_frames(seconds, opened.sample_rate);

    println!("Rendering {:.2}s to {}", seconds, path.display());
    println!(
        "  {} Hz, {}-bit, reverb {}",
        format.sample_rate,
        format.bits_per_sample,
        live.reverb_amount()
    );

    let pb = ProgressBar::new(frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("progress bar template")?
            .progress_chars("##-"),
    );

    let written = record_to_wav(&mut mixer, path, format, frames, |n| pb.set_position(n))
        .with_context(|| format!("writing {}", path.display()))?;
    pb.finish_and_clear();

    println!("Wrote {} frames to {}", written, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapline_core::ToneSource;

    #[test]
    fn test_render_tone_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        let mut settings = PlayerSettings::default();
        settings.reverb.amount = 6;

        let opened = OpenedSource {
            source: Box::new(ToneSource::new(8000, 440.0, 8000).with_gating(50, 100)),
            sample_rate: 8000,
            frames: None,
        };
        render_to_file(opened, &settings, &path, 0.5).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.len(), 8000);
    }
}
