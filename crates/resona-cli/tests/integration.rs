//! Integration tests for the `resona` binary.
//!
//! Each test points the config directory at a fresh temp dir so user presets
//! and `resona.toml` on the host never leak in.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the `resona` binary with an isolated config home.
fn resona_bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_resona"));
    cmd.env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env("RUST_LOG", "warn");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    resona_bin(home)
        .args(args)
        .output()
        .expect("failed to run resona")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// presets
// ---------------------------------------------------------------------------

#[test]
fn cli_presets_list_shows_factory_presets() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["presets", "list"]);
    assert!(output.status.success(), "presets list failed");

    let text = stdout(&output);
    for id in ["khufu", "khafre", "menkaure"] {
        assert!(text.contains(id), "listing should contain '{id}'");
    }
    assert!(text.contains("30 tones"));
}

#[test]
fn cli_presets_list_json() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["presets", "list", "--json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["id"], "khufu");
    assert_eq!(list[0]["tones"], 30);
    assert_eq!(list[1]["tones"], 63);
    assert_eq!(list[2]["tones"], 14);
    assert_eq!(list[2]["origin"], "factory");
}

#[test]
fn cli_presets_show_khufu() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["presets", "show", "khufu"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Preset: khufu"));
    assert!(text.contains("16.39"));
    assert!(text.contains("88.28"));
}

#[test]
fn cli_presets_show_unknown_fails() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["presets", "show", "sneferu"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sneferu"));
}

// ---------------------------------------------------------------------------
// resonance
// ---------------------------------------------------------------------------

#[test]
fn cli_resonance_named_chamber() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["resonance", "--chamber", "khufu", "--json"]);
    assert!(output.status.success());

    let modes: Vec<f64> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(modes[0], 16.39);
    assert!(modes.windows(2).all(|w| w[0] < w[1]));
    assert!(modes.iter().all(|&f| f > 0.0 && f <= 100.0));
}

#[test]
fn cli_resonance_dimensions() {
    let home = TempDir::new().unwrap();
    let output = run(
        home.path(),
        &[
            "resonance", "--length", "10", "--width", "10", "--height", "10", "--max-mode", "1",
            "--max-freq", "1000", "--json",
        ],
    );
    assert!(output.status.success());
    let modes: Vec<f64> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(modes, vec![56.3, 79.62, 97.51]);
}

#[test]
fn cli_resonance_requires_dimensions() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["resonance", "--length", "10"]);
    assert!(!output.status.success());
}

#[cfg(target_os = "linux")]
#[test]
fn cli_resonance_save_adds_user_preset() {
    let home = TempDir::new().unwrap();
    let output = run(
        home.path(),
        &["resonance", "--chamber", "menkaure", "--save", "menkaure_modes"],
    );
    assert!(output.status.success());
    assert!(home.path().join("resona/presets/menkaure_modes.toml").is_file());

    let output = run(home.path(), &["presets", "list", "--json"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list[3]["id"], "menkaure_modes");
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_faded_wav() {
    let home = TempDir::new().unwrap();
    let wav = home.path().join("menkaure.wav");
    let output = run(
        home.path(),
        &[
            "render",
            "--preset",
            "menkaure",
            "--output",
            wav.to_str().unwrap(),
            "--hold",
            "0.5",
            "--sample-rate",
            "8000",
        ],
    );
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (samples, spec) = resona_io::read_wav(&wav).unwrap();
    assert_eq!(spec.sample_rate, 8000);
    // 2 s fade in + 0.5 s hold + 2 s fade out.
    assert_eq!(samples.len(), 36000);
    assert_eq!(samples[0], 0.0);

    let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, x| m.max(x.abs()));
    let hold = peak(&samples[16000..20000]);
    assert!(hold > 0.01);
    assert!(samples.iter().all(|s| s.abs() <= 1.0));
    // The fade ends at 0.001 of full level.
    assert!(peak(&samples[35920..]) < 0.002);
}

#[test]
fn cli_render_unknown_preset_fails() {
    let home = TempDir::new().unwrap();
    let wav = home.path().join("none.wav");
    let output = run(
        home.path(),
        &["render", "--preset", "sneferu", "--output", wav.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(!wav.exists());
}

#[test]
fn cli_render_uses_config_fades() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("short.toml");
    std::fs::write(
        &config,
        "[playback]\nfade_in_secs = 0.25\nfade_out_secs = 0.25\n",
    )
    .unwrap();
    let wav = home.path().join("short.wav");
    let output = run(
        home.path(),
        &[
            "render",
            "--preset",
            "khufu",
            "--output",
            wav.to_str().unwrap(),
            "--hold",
            "0",
            "--sample-rate",
            "8000",
            "--config",
            config.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    let (samples, _) = resona_io::read_wav(&wav).unwrap();
    assert_eq!(samples.len(), 4000);
}
