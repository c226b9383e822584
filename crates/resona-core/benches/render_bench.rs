//! Criterion benchmarks for tone graph rendering.
//!
//! Measures one block of a full ensemble (generators, attenuators, fader,
//! compressor) at varying ensemble and block sizes.
//!
//! Run with: `cargo bench -p resona-core -- render/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use resona_core::{EngineState, Fade, GraphSettings, OfflineEngine, Preset, Session, build};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];
const ENSEMBLE_SIZES: &[usize] = &[14, 30, 63];

fn session(tones: usize) -> Session<OfflineEngine> {
    let freqs = (0..tones).map(|i| 16.39 + i as f32 * 1.37).collect();
    let preset = Preset::new("bench", freqs).expect("valid preset");
    let engine = OfflineEngine::new(SAMPLE_RATE, EngineState::Running);
    let mut session = build(engine, &preset, &GraphSettings::default()).expect("graph builds");
    let fader = session.fader();
    Fade::fade_in(0.0)
        .schedule(session.engine_mut(), fader)
        .expect("fade schedules");
    session
}

fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/ensemble");
    for &tones in ENSEMBLE_SIZES {
        let mut session = session(tones);
        let mut block = vec![0.0f32; 256];
        group.bench_with_input(BenchmarkId::from_parameter(tones), &tones, |b, _| {
            b.iter(|| {
                session.engine_mut().render(black_box(&mut block));
            });
        });
    }
    group.finish();
}

fn bench_block_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/block");
    for &size in BLOCK_SIZES {
        let mut session = session(30);
        let mut block = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                session.engine_mut().render(black_box(&mut block));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ensemble, bench_block_size);
criterion_main!(benches);
