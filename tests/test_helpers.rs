//! Helper functions and utilities for tests

#![allow(dead_code)]

use affect_pipeline::landmarks::{neutral_face, Landmark, LandmarkFrame, LandmarkLayout};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Neutral face with both mouth corners raised to `corner_y`
/// (0.8 is neutral, 0.68 a full smile)
pub fn smiling_face(layout: LandmarkLayout, corner_y: f64) -> Vec<Landmark> {
    let map = layout.index_map();
    let mut face = neutral_face(layout);
    face[map.mouth_corners[0]].y = corner_y;
    face[map.mouth_corners[1]].y = corner_y;
    face
}

/// Smile that moves the mouth corners outwards without cheek involvement
pub fn mouth_only_smile(layout: LandmarkLayout) -> Vec<Landmark> {
    let map = layout.index_map();
    let mut face = neutral_face(layout);
    face[map.mouth_corners[0]] = Landmark::new(-0.45, 0.74);
    face[map.mouth_corners[1]] = Landmark::new(0.45, 0.74);
    face
}

/// Neutral face with only the image-left mouth corner raised
pub fn lopsided_smile(layout: LandmarkLayout) -> Vec<Landmark> {
    let map = layout.index_map();
    let mut face = neutral_face(layout);
    face[map.mouth_corners[0]].y = 0.68;
    face
}

/// Neutral face with both eyelids shut
pub fn closed_eyes(layout: LandmarkLayout) -> Vec<Landmark> {
    let map = layout.index_map();
    let mut face = neutral_face(layout);
    for side in 0..2 {
        for slot in [1, 2, 4, 5] {
            face[map.eye_contour[side][slot]].y = 0.0;
        }
        face[map.eye_top[side]].y = 0.0;
        face[map.eye_bottom[side]].y = 0.0;
    }
    face
}

/// Uniform jitter of up to `amplitude` on every coordinate
pub fn jitter(landmarks: &[Landmark], amplitude: f64, rng: &mut StdRng) -> Vec<Landmark> {
    landmarks
        .iter()
        .map(|lm| {
            Landmark::new(
                lm.x + rng.gen_range(-amplitude..=amplitude),
                lm.y + rng.gen_range(-amplitude..=amplitude),
            )
        })
        .collect()
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

/// Detected frame at `timestamp_ms`
pub fn frame(timestamp_ms: f64, landmarks: Vec<Landmark>) -> LandmarkFrame {
    LandmarkFrame::detected(timestamp_ms, landmarks)
}

/// Sine tone at 16 kHz
#[allow(clippy::cast_precision_loss)]
pub fn tone(freq_hz: f32, amplitude: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / 16_000.0).sin())
        .collect()
}

/// Mean absolute distance between two landmark sets
pub fn mean_error(a: &[Landmark], b: &[Landmark]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = a.len().max(1) as f64;
    a.iter().zip(b).map(|(p, q)| p.distance(q)).sum::<f64>() / n
}
