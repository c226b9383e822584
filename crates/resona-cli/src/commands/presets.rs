//! Preset listing and inspection.

use super::common::{format_frequencies, load_config};
use clap::{Args, Subcommand};
use resona_config::{PresetCatalog, user_presets_dir};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,

    /// Config file (defaults to the user config)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List available presets (factory, user and config)
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the frequencies of a preset
    Show {
        /// Preset id
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the user presets directory
    Paths,
}

#[derive(Serialize)]
struct PresetSummary<'a> {
    id: &'a str,
    tones: usize,
    lowest_hz: f32,
    highest_hz: f32,
    origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct PresetDetail<'a> {
    #[serde(flatten)]
    summary: PresetSummary<'a>,
    frequencies: &'a [f32],
}

fn summarize<'a>(catalog: &'a PresetCatalog, id: &'a str) -> anyhow::Result<PresetSummary<'a>> {
    let preset = catalog.get(id)?;
    let freqs = preset.frequencies();
    Ok(PresetSummary {
        id: preset.id(),
        tones: freqs.len(),
        lowest_hz: freqs.iter().copied().fold(f32::INFINITY, f32::min),
        highest_hz: freqs.iter().copied().fold(0.0, f32::max),
        origin: catalog
            .origin(id)
            .map_or_else(|| "unknown".to_string(), ToString::to_string),
        description: catalog.description(id),
    })
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let catalog = PresetCatalog::load(&config);

    match args.command {
        PresetsCommand::List { json } => list_presets(&catalog, json),
        PresetsCommand::Show { id, json } => show_preset(&catalog, &id, json),
        PresetsCommand::Paths => {
            println!("User presets: {}", user_presets_dir().display());
            Ok(())
        }
    }
}

fn list_presets(catalog: &PresetCatalog, json: bool) -> anyhow::Result<()> {
    let summaries = catalog
        .table()
        .ids()
        .map(|id| summarize(catalog, id))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Presets:");
    println!("========");
    for s in &summaries {
        println!(
            "  {:20} {:3} tones  {:6.2}-{:6.2} Hz  [{}]",
            s.id, s.tones, s.lowest_hz, s.highest_hz, s.origin
        );
        if let Some(desc) = s.description {
            println!("  {:20} {}", "", desc);
        }
    }
    if catalog.skipped() > 0 {
        println!();
        println!("  ({} preset file(s) could not be loaded)", catalog.skipped());
    }
    Ok(())
}

fn show_preset(catalog: &PresetCatalog, id: &str, json: bool) -> anyhow::Result<()> {
    let summary = summarize(catalog, id)?;
    let frequencies = catalog.get(id)?.frequencies();

    if json {
        let detail = PresetDetail {
            summary,
            frequencies,
        };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("Preset: {}", summary.id);
    println!("{}", "=".repeat(8 + summary.id.len()));
    if let Some(desc) = summary.description {
        println!("Description: {desc}");
    }
    println!("Source: {}", summary.origin);
    println!();
    println!("Frequencies ({} tones, Hz):", summary.tones);
    println!(
        "{}",
        format_frequencies(frequencies.iter().map(|&f| f64::from(f)), 8)
    );
    Ok(())
}
