//! Devices command: list audio outputs.

use anyhow::Result;
use clap::{Args, Subcommand};
use tapline_io::{default_output_device, list_output_devices, select_device};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all output devices (default)
    List,

    /// Show the default output device
    Default,

    /// Resolve a device index or name the way `play --output` does
    Find {
        /// Device index or (partial) name
        query: String,
    },
}

pub fn run(args: DevicesArgs) -> Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => list(),
        DevicesCommand::Default => show_default(),
        DevicesCommand::Find { query } => find(&query),
    }
}

fn list() -> Result<()> {
    let devices = list_output_devices()?;

    println!("Output Devices");
    println!("==============");
    if devices.is_empty() {
        println!("  (none)");
    }
    for (i, device) in devices.iter().enumerate() {
        let marker = if device.is_default { " [default]" } else { "" };
        println!(
            "  [{}] {} ({} Hz){}",
            i, device.name, device.default_sample_rate, marker
        );
    }

    Ok(())
}

fn show_default() -> Result<()> {
    match default_output_device()? {
        Some(device) => println!("{} ({} Hz)", device.name, device.default_sample_rate),
        None => println!("No default output device"),
    }
    Ok(())
}

fn find(query: &str) -> Result<()> {
    let devices = list_output_devices()?;
    let device = select_device(&devices, query)?;
    println!("{} ({} Hz)", device.name, device.default_sample_rate);
    Ok(())
}
