//! Offline render of a preset to a WAV file.
//!
//! Drives the same playback controller as `play`, on an offline engine and
//! a manual clock: start, fade in, hold, stop, fade out, teardown.

use super::common::{load_catalog, load_config};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use resona_core::{
    LifecycleState, ManualClock, OfflineEngineProvider, PlaybackController, seconds_to_samples,
};
use resona_io::{WavSpec, write_wav};
use std::path::PathBuf;

const BLOCK_SIZE: usize = 1024;

#[derive(Args)]
pub struct RenderArgs {
    /// Preset to render
    #[arg(short, long)]
    preset: String,

    /// Output WAV file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Seconds to hold at full level between the fades
    #[arg(long, default_value = "10.0")]
    hold: f64,

    /// Sample rate in Hz (defaults to the configured rate)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Bit depth (16 or 32 float)
    #[arg(long, default_value = "32", value_parser = clap::value_parser!(u16).range(16..=32))]
    bits: u16,

    /// Config file (defaults to the user config)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !(args.hold.is_finite() && args.hold >= 0.0) {
        anyhow::bail!("--hold must be a non-negative number of seconds");
    }
    if args.bits != 16 && args.bits != 32 {
        anyhow::bail!("--bits must be 16 or 32");
    }

    let config = load_config(args.config.as_deref())?;
    let catalog = load_catalog(&config, Some(&args.preset))?;
    let settings = config.playback_settings()?;
    let sample_rate = args.sample_rate.unwrap_or(config.audio.sample_rate);
    if sample_rate == 0 {
        anyhow::bail!("sample rate must be positive");
    }
    let sr = sample_rate as f32;

    let clock = ManualClock::new();
    let mut controller = PlaybackController::with_clock(
        OfflineEngineProvider::new(sr),
        catalog.into_table(),
        settings,
        clock.clone(),
    );

    let playing_samples = seconds_to_samples(settings.fade_in.as_secs_f64() + args.hold, sr);
    let fade_out_samples = seconds_to_samples(settings.fade_out.as_secs_f64(), sr);
    let total = playing_samples + fade_out_samples;

    println!(
        "Rendering '{}' to {} ({:.1}s at {} Hz)",
        args.preset,
        args.output.display(),
        total as f64 / f64::from(sample_rate),
        sample_rate
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("progress template")?
            .progress_chars("##-"),
    );

    controller.start(&args.preset)?;
    let mut output = vec![0.0f32; total];
    let (playing, fading) = output.split_at_mut(playing_samples);

    render_span(&mut controller, playing, &pb, 0);
    controller.stop();
    render_span(&mut controller, fading, &pb, playing_samples);

    clock.advance(settings.fade_out);
    if controller.poll() != LifecycleState::Idle {
        controller.shutdown();
    }
    pb.finish_with_message("done");

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: args.bits,
    };
    write_wav(&args.output, &output, spec)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let peak = output.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    println!("Peak: {:.4} ({:.1} dBFS)", peak, resona_core::linear_to_db(peak));
    println!("Wrote {} samples to {}", output.len(), args.output.display());
    Ok(())
}

fn render_span(
    controller: &mut PlaybackController<OfflineEngineProvider, ManualClock>,
    out: &mut [f32],
    pb: &ProgressBar,
    offset: usize,
) {
    let Some(session) = controller.session_mut() else {
        out.fill(0.0);
        return;
    };
    let engine = session.engine_mut();
    let mut done = 0;
    for block in out.chunks_mut(BLOCK_SIZE) {
        engine.render(block);
        done += block.len();
        pb.set_position((offset + done) as u64);
    }
}

