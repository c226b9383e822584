//! Room-mode calculator.

use super::common::format_frequencies;
use clap::Args;
use resona_config::{
    Chamber, ModeSearch, NAMED_CHAMBERS, PresetFile, room_modes, save_user_preset,
};

#[derive(Args)]
pub struct ResonanceArgs {
    /// Named chamber (khufu, khafre, menkaure)
    #[arg(long, conflicts_with_all = ["length", "width", "height"])]
    chamber: Option<String>,

    /// Chamber length
    #[arg(long, required_unless_present = "chamber")]
    length: Option<f64>,

    /// Chamber width
    #[arg(long, required_unless_present = "chamber")]
    width: Option<f64>,

    /// Chamber height
    #[arg(long, required_unless_present = "chamber")]
    height: Option<f64>,

    /// Highest mode index on each axis
    #[arg(long, default_value = "5")]
    max_mode: u32,

    /// Highest frequency to keep, in Hz
    #[arg(long, default_value = "100")]
    max_freq: f64,

    /// Speed of sound in length units per second (default: feet)
    #[arg(long, default_value = "1126")]
    speed: f64,

    /// Save the result as a user preset with this id
    #[arg(long, value_name = "ID")]
    save: Option<String>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

fn chamber(args: &ResonanceArgs) -> anyhow::Result<(Chamber, String)> {
    if let Some(name) = &args.chamber {
        let chamber = Chamber::named(name).map_err(|e| {
            let known: Vec<&str> = NAMED_CHAMBERS.iter().map(|(id, _)| *id).collect();
            anyhow::anyhow!("{e} (known: {})", known.join(", "))
        })?;
        return Ok((chamber, name.to_lowercase()));
    }
    match (args.length, args.width, args.height) {
        (Some(l), Some(w), Some(h)) => Ok((Chamber::new(l, w, h), format!("{l} x {w} x {h}"))),
        _ => anyhow::bail!("give --chamber or all of --length, --width and --height"),
    }
}

pub fn run(args: ResonanceArgs) -> anyhow::Result<()> {
    let (chamber, label) = chamber(&args)?;
    let search = ModeSearch {
        max_mode: args.max_mode,
        max_freq: args.max_freq,
        speed_of_sound: args.speed,
    };
    let modes = room_modes(&chamber, &search)?;

    if args.json {
        println!("{}", serde_json::to_string(&modes)?);
    } else {
        println!("Room modes of {label} ({} up to {} Hz):", modes.len(), args.max_freq);
        println!("{}", format_frequencies(modes.iter().copied(), 8));
    }

    if let Some(id) = args.save {
        let description = format!(
            "Room modes of {} x {} x {}",
            chamber.length, chamber.width, chamber.height
        );
        let file = PresetFile::new(id, modes).with_description(description);
        let path = save_user_preset(&file)?;
        // Keep stdout parseable in JSON mode.
        eprintln!("Saved preset '{}' to {}", file.id, path.display());
    }
    Ok(())
}
