//! Play command: real-time output through the reverb.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use tapline_config::SharedSettings;
use tapline_core::{ChannelLayout, DspMixer};
use tapline_effects::ReverbStage;
use tapline_io::{CpalBackend, OutputAdapter, Player, list_output_devices, select_device};

use super::common::{self, SourceArgs, TuningArgs};

/// How often the main thread checks for the end of playback.
const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Time to keep playing after a file ends so the tail can decay.
const TAIL_SECS: f64 = 2.0;

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Output gain numerator (256 = unity)
    #[arg(short, long, value_name = "V")]
    volume: Option<i16>,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "S")]
    seconds: Option<f64>,

    /// Output device (index or name)
    #[arg(short, long, value_name = "DEV")]
    output: Option<String>,

    /// Frames per device buffer
    #[arg(long, value_name = "FRAMES")]
    buffer: Option<u32>,

    /// Loop the file
    #[arg(short, long, alias = "repeat")]
    r#loop: bool,

    /// Write the overrides back to the settings file
    #[arg(long)]
    save: bool,
}

pub fn run(args: PlayArgs, config: Option<PathBuf>) -> Result<()> {
    let (mut settings, settings_file) = common::load_settings(config.as_deref())?;
    if let Some(volume) = args.volume {
        settings.volume = volume;
    }
    if let Some(device) = &args.output {
        settings.output.device = Some(device.clone());
    }
    if let Some(frames) = args.buffer {
        settings.output.buffer_frames = frames;
    }
    common::apply_tuning(&mut settings, &args.tuning)?;

    let opened = common::open_source(&args.source, &mut settings, &args.tuning, args.r#loop)?;

    if settings.disk_saver.enabled {
        let seconds = args.seconds.unwrap_or_else(|| match opened.frames {
            Some(n) => n as f64 / f64::from(opened.sample_rate) + TAIL_SECS,
            None => super::render::DEFAULT_TONE_SECS,
        });
        let path = settings.disk_saver.path.clone();
        println!("Disk saver enabled, rendering to {}", path.display());
        return super::render::render_to_file(opened, &settings, &path, seconds);
    }

    let mut stream_config = settings.stream_config();
    stream_config.sample_rate = opened.sample_rate;
    if let Some(query) = &settings.output.device {
        let devices = list_output_devices()?;
        let device = select_device(&devices, query)?;
        stream_config.device_name = Some(device.name.clone());
    }

    let live = SharedSettings::from_settings(&settings);
    let stage = ReverbStage::new(opened.sample_rate, Arc::clone(live.reverb()))
        .with_policy(settings.reverb.rate_policy());
    let chunk = stream_config.buffer_size as usize * 2;
    let mixer = DspMixer::new(opened.source, stage, ChannelLayout::Stereo, chunk);
    let adapter = OutputAdapter::new(mixer, Arc::clone(live.volume()));
    let mut player = Player::new(adapter, stream_config);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let backend = CpalBackend::new();
    player
        .start_playing(&backend)
        .context("starting playback")?;

    println!(
        "Playing at {} Hz, reverb {}, volume {}",
        opened.sample_rate,
        live.reverb_amount(),
        live.volume_level()
    );
    if args.seconds.is_none() {
        println!("Press Ctrl+C to stop");
    }

    let started = Instant::now();
    let limit = args.seconds.map(|s| Duration::from_secs_f64(s.max(0.0)));
    let mut finished_at: Option<Instant> = None;
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(POLL_INTERVAL);

        if limit.is_some_and(|l| started.elapsed() >= l) {
            break;
        }
        if finished_at.is_none() && player.with_adapter(|a| a.mixer().is_finished()) {
            finished_at = Some(Instant::now());
        }
        if finished_at.is_some_and(|t| t.elapsed().as_secs_f64() >= TAIL_SECS) {
            break;
        }
    }

    player.stop_playing();
    println!("Stopped after {:.1}s", started.elapsed().as_secs_f64());

    if args.save {
        live.store_into(&mut settings);
        settings
            .save(&settings_file)
            .with_context(|| format!("saving settings to {}", settings_file.display()))?;
        println!("Saved settings to {}", settings_file.display());
    }

    Ok(())
}
