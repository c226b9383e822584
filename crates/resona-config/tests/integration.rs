//! Integration tests: factory and computed presets driven through the
//! playback controller on offline engines.

use std::time::Duration;

use resona_config::{
    AppConfig, Chamber, ModeSearch, PresetCatalog, PresetFile, chamber_preset, save_preset_in,
};
use resona_core::{
    AudioEngine, EngineState, LifecycleState, ManualClock, OfflineEngineProvider,
    PlaybackController,
};
use tempfile::TempDir;

fn controller(
    config: &AppConfig,
    dir: &std::path::Path,
) -> (PlaybackController<OfflineEngineProvider, ManualClock>, ManualClock) {
    let catalog = PresetCatalog::load_from(dir, config);
    let clock = ManualClock::new();
    let controller = PlaybackController::with_clock(
        OfflineEngineProvider::new(8000.0),
        catalog.into_table(),
        config.playback_settings().unwrap(),
        clock.clone(),
    );
    (controller, clock)
}

#[test]
fn khufu_plays_and_releases_engine() {
    let dir = TempDir::new().unwrap();
    let (mut controller, clock) = controller(&AppConfig::default(), dir.path());
    assert_eq!(controller.selected_preset(), Some("khufu"));

    controller.start("khufu").unwrap();
    assert_eq!(controller.state(), LifecycleState::Playing);
    assert_eq!(controller.generator_count(), 30);

    let session = controller.session().unwrap();
    let units = session.units();
    assert_eq!(units.first().unwrap().frequency, 16.39);
    assert_eq!(units.last().unwrap().frequency, 88.28);
    assert_eq!(session.engine().state(), EngineState::Running);

    controller.stop();
    assert_eq!(controller.state(), LifecycleState::StoppingFadeOut);
    clock.advance(Duration::from_secs(2));
    assert_eq!(controller.poll(), LifecycleState::Idle);
    assert_eq!(controller.generator_count(), 0);
    assert!(controller.session().is_none());
    assert_eq!(controller.provider().closed(), 1);
}

#[test]
fn every_factory_preset_builds_its_ensemble() {
    let dir = TempDir::new().unwrap();
    let (mut controller, clock) = controller(&AppConfig::default(), dir.path());

    for (id, tones) in [("khufu", 30), ("khafre", 63), ("menkaure", 14)] {
        controller.start(id).unwrap();
        assert_eq!(controller.generator_count(), tones, "{id}");
        controller.stop();
        clock.advance(Duration::from_secs(2));
        controller.poll();
    }
    assert_eq!(controller.provider().acquired(), 3);
    assert_eq!(controller.provider().closed(), 3);
}

#[test]
fn config_fade_timing_controls_teardown() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::from_toml("[playback]\nfade_out_secs = 0.5").unwrap();
    let (mut controller, clock) = controller(&config, dir.path());

    controller.start("menkaure").unwrap();
    controller.stop();
    clock.advance(Duration::from_millis(499));
    assert_eq!(controller.poll(), LifecycleState::StoppingFadeOut);
    clock.advance(Duration::from_millis(1));
    assert_eq!(controller.poll(), LifecycleState::Idle);
}

#[test]
fn computed_chamber_saved_and_played() {
    let dir = TempDir::new().unwrap();
    let preset = chamber_preset(
        "queens",
        &Chamber::new(18.87, 17.19, 20.34),
        &ModeSearch::default(),
    )
    .unwrap();
    save_preset_in(dir.path(), &PresetFile::from(&preset)).unwrap();

    let (mut controller, _clock) = controller(&AppConfig::default(), dir.path());
    assert!(controller.presets().contains("queens"));

    controller.start("queens").unwrap();
    assert_eq!(controller.generator_count(), preset.frequencies().len());
    let freqs: Vec<f32> = controller
        .session()
        .unwrap()
        .units()
        .iter()
        .map(|u| u.frequency)
        .collect();
    assert_eq!(freqs, preset.frequencies());
}

#[test]
fn unknown_preset_leaves_controller_idle() {
    let dir = TempDir::new().unwrap();
    let (mut controller, _clock) = controller(&AppConfig::default(), dir.path());
    assert!(controller.start("sneferu").is_err());
    assert_eq!(controller.state(), LifecycleState::Idle);
    assert_eq!(controller.provider().acquired(), 0);
}
