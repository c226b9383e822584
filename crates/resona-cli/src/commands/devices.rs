//! Output device listing.

use clap::Args;
use resona_io::list_devices;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} ch, {} Hz){}",
            idx, device.name, device.channels, device.default_sample_rate, default
        );
    }
    println!();
    println!("Tip: Use device index or partial name with --output:");
    println!("  resona play --output 0");
    println!("  resona play --output \"USB\"");
    Ok(())
}
