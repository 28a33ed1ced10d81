//! Tapline CLI - play or render audio through the integer reverb pipeline.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tapline")]
#[command(author, version, about = "Multi-tap reverb player", long_about = None)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a WAV file or test tone through the reverb
    Play(commands::play::PlayArgs),

    /// Render a WAV file or test tone through the reverb to disk
    Render(commands::render::RenderArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),

    /// Show reverb tap lengths for a sample rate
    Taps(commands::taps::TapsArgs),
}

/// Install the stderr subscriber, then bridge `log` records from cpal.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    // The subscriber may already have installed the bridge.
    tracing_log::LogTracer::init().ok();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Play(args) => commands::play::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Taps(args) => commands::taps::run(args),
    }
}
