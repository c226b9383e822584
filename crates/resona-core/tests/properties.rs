//! Property-based tests for resona-core.
//!
//! Automation curves stay within their endpoints, and rendered ensembles of
//! any size stay finite and bounded.

use proptest::prelude::*;
use resona_core::{
    AudioEngine, AutomationTimeline, Compressor, CompressorSettings, EngineState, Fade,
    GraphSettings, OfflineEngine, Preset, build,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A linear ramp never leaves the interval spanned by its endpoints.
    #[test]
    fn linear_ramp_bounded(
        from in -2.0f32..2.0f32,
        to in -2.0f32..2.0f32,
        start in 0.0f64..5.0,
        len in 0.01f64..5.0,
        probe in 0.0f64..1.0,
    ) {
        let mut t = AutomationTimeline::new(0.0);
        t.set_value_at_time(from, start).unwrap();
        t.linear_ramp_to_value_at_time(to, start + len).unwrap();
        let v = t.value_at(start + probe * len);
        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        prop_assert!(v >= lo - 1e-5 && v <= hi + 1e-5, "{} outside [{}, {}]", v, lo, hi);
    }

    /// An exponential fade-out decreases monotonically to its floor.
    #[test]
    fn exponential_fade_monotonic(
        anchor in 0.002f32..1.0f32,
        floor in 0.0001f32..0.001f32,
        len in 0.1f64..4.0,
    ) {
        let mut t = AutomationTimeline::new(anchor);
        t.set_value_at_time(anchor, 0.0).unwrap();
        t.exponential_ramp_to_value_at_time(floor, len).unwrap();
        let mut last = t.value_at(0.0);
        for step in 1..=50 {
            let v = t.value_at(len * f64::from(step) / 50.0);
            prop_assert!(v <= last + 1e-7);
            last = v;
        }
        prop_assert!((last - floor).abs() < 1e-6);
    }

    /// Pruning completed events never changes future values.
    #[test]
    fn prune_is_transparent(
        values in prop::collection::vec(0.01f32..1.0f32, 2..8),
        cut in 0.0f64..10.0,
    ) {
        let mut t = AutomationTimeline::new(0.5);
        for (i, &v) in values.iter().enumerate() {
            let time = i as f64 * 1.5;
            if i % 2 == 0 {
                t.linear_ramp_to_value_at_time(v, time).unwrap();
            } else {
                t.exponential_ramp_to_value_at_time(v, time).unwrap();
            }
        }
        let probes: Vec<f64> = (0..20).map(|i| cut + f64::from(i) * 0.4).collect();
        let before: Vec<f32> = probes.iter().map(|&p| t.value_at(p)).collect();
        t.prune(cut);
        let after: Vec<f32> = probes.iter().map(|&p| t.value_at(p)).collect();
        prop_assert_eq!(before, after);
    }

    /// The compressor never amplifies.
    #[test]
    fn compressor_never_boosts(input in prop::collection::vec(-4.0f32..4.0f32, 1..512)) {
        let mut comp = Compressor::new(48000.0, CompressorSettings::default());
        for &x in &input {
            let y = comp.process(x);
            prop_assert!(y.abs() <= x.abs() + 1e-6);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any ensemble at full level renders finite samples within [-1, 1].
    #[test]
    fn ensemble_output_bounded(freqs in prop::collection::vec(10.0f32..400.0f32, 1..64)) {
        let preset = Preset::new("random", freqs).unwrap();
        let engine = OfflineEngine::new(8000.0, EngineState::Running);
        let mut session = build(engine, &preset, &GraphSettings::default()).unwrap();

        let fader = session.fader();
        Fade::fade_in(0.05).schedule(session.engine_mut(), fader).unwrap();
        let out = session.engine_mut().render_seconds(0.5);

        for &s in &out {
            prop_assert!(s.is_finite());
            prop_assert!((-1.0..=1.0).contains(&s), "sample {} out of range", s);
        }
        prop_assert!(session.engine().current_time() > 0.49);
    }
}
