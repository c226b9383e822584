//! Resona CLI - play, render and inspect chamber tone ensembles.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resona")]
#[command(author, version, about = "Chamber resonance tone player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play presets interactively on an output device
    Play(commands::play::PlayArgs),

    /// Render a fade-in, hold and fade-out of a preset to a WAV file
    Render(commands::render::RenderArgs),

    /// List and inspect presets
    Presets(commands::presets::PresetsArgs),

    /// Compute room-mode frequencies of a rectangular chamber
    Resonance(commands::resonance::ResonanceArgs),

    /// List output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Resonance(args) => commands::resonance::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
