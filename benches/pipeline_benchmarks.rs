//! Benchmarks for the per-frame and per-window analysis chains

use affect_pipeline::{
    action_units::{ActionUnitExtractor, AuCalibration},
    config::Config,
    landmarks::{neutral_face, LandmarkFrame, LandmarkLayout},
    pipeline::AffectPipeline,
    voice::{features::VoiceFeatureExtractor, VoiceConfig},
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::f32::consts::PI;

fn smiling_face(layout: LandmarkLayout) -> Vec<affect_pipeline::landmarks::Landmark> {
    let map = layout.index_map();
    let mut face = neutral_face(layout);
    face[map.mouth_corners[0]].y = 0.7;
    face[map.mouth_corners[1]].y = 0.7;
    face
}

fn voiced_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.2 * (2.0 * PI * 180.0 * i as f32 / 16_000.0).sin() + 0.01 * (rand::random::<f32>() - 0.5))
        .collect()
}

fn benchmark_action_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("action_units");

    for layout in [LandmarkLayout::Sparse68, LandmarkLayout::Dense468] {
        let extractor = ActionUnitExtractor::new(layout.index_map(), AuCalibration::default());
        let face = smiling_face(layout);
        group.bench_with_input(
            BenchmarkId::new("extract", layout.point_count()),
            &face,
            |b, face| {
                b.iter(|| black_box(extractor.extract(black_box(face))));
            },
        );
    }

    group.finish();
}

fn benchmark_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice");
    let mut extractor = VoiceFeatureExtractor::new(&VoiceConfig::default());

    for len in [1024, 8000] {
        let window = voiced_window(len);
        group.bench_with_input(BenchmarkId::new("extract", len), &window, |b, window| {
            b.iter(|| black_box(extractor.extract(black_box(window))));
        });
    }

    group.finish();
}

fn benchmark_process_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_frame");

    for layout in [LandmarkLayout::Sparse68, LandmarkLayout::Dense468] {
        let mut config = Config::default();
        config.landmarks.point_count = layout.point_count();
        let mut pipeline = AffectPipeline::new(config).unwrap();
        pipeline.process_audio(0.0, &voiced_window(8000));

        let frames: Vec<LandmarkFrame> = (0..30)
            .map(|i| {
                let face = if i % 10 < 5 { neutral_face(layout) } else { smiling_face(layout) };
                LandmarkFrame::detected(f64::from(i) * 33.0, face)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("sequence_30", layout.point_count()),
            &frames,
            |b, frames| {
                b.iter(|| {
                    pipeline.reset();
                    for frame in frames {
                        black_box(pipeline.process_frame(black_box(frame)));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_action_units, benchmark_voice, benchmark_process_frame);
criterion_main!(benches);
