//! Tests for the voice chain on synthetic audio

mod test_helpers;

use affect_pipeline::{
    emotion::Emotion,
    voice::{
        features::{VoiceFeatureExtractor, MIN_WINDOW_SAMPLES},
        VoiceAnalyzer, VoiceConfig,
    },
};
use rand::Rng;
use test_helpers::{seeded_rng, tone};

#[test]
fn test_pitch_tracks_tones() {
    let mut extractor = VoiceFeatureExtractor::new(&VoiceConfig::default());
    for freq in [160.0, 200.0, 250.0] {
        let features = extractor.extract(&tone(freq, 0.3, 4096));
        assert!(
            (features.pitch_hz - f64::from(freq)).abs() < 2.0,
            "{freq} Hz -> {}",
            features.pitch_hz
        );
        assert!(features.is_voiced());
    }
}

#[test]
fn test_energy_scales_with_amplitude() {
    let mut extractor = VoiceFeatureExtractor::new(&VoiceConfig::default());
    let quiet = extractor.extract(&tone(200.0, 0.05, 2048));
    let loud = extractor.extract(&tone(200.0, 0.2, 2048));
    assert!(quiet.energy < loud.energy);
    assert!(loud.energy <= 1.0);

    let clipped = extractor.extract(&tone(200.0, 1.0, 2048));
    assert_eq!(clipped.energy, 1.0);
}

#[test]
fn test_silence_and_short_windows() {
    let mut extractor = VoiceFeatureExtractor::new(&VoiceConfig::default());

    let silence = extractor.extract(&vec![0.0; 2048]);
    assert_eq!(silence.pitch_hz, 0.0);
    assert_eq!(silence.energy, 0.0);
    assert!(!silence.is_voiced());

    let short = extractor.extract(&tone(200.0, 0.3, MIN_WINDOW_SAMPLES - 1));
    assert_eq!(short.pitch_hz, 0.0);
    assert_eq!(short.energy, 0.0);
}

#[test]
fn test_white_noise_is_unvoiced() {
    let mut rng = seeded_rng();
    let noise: Vec<f32> = (0..4096).map(|_| rng.gen_range(-0.3..0.3)).collect();
    let features = VoiceFeatureExtractor::new(&VoiceConfig::default()).extract(&noise);
    assert_eq!(features.pitch_hz, 0.0);
    assert!(features.zero_crossing_rate > 0.3);
}

#[test]
fn test_non_finite_samples_are_ignored() {
    let mut samples = tone(200.0, 0.3, 2048);
    samples[100] = f32::NAN;
    samples[200] = f32::INFINITY;
    let features = VoiceFeatureExtractor::new(&VoiceConfig::default()).extract(&samples);
    assert!(features.energy.is_finite());
    assert!(features.spectral_centroid_hz.is_finite());
    assert!((features.pitch_hz - 200.0).abs() < 2.0);
}

#[test]
fn test_low_quiet_voice_reads_sad_and_monotone() {
    let mut analyzer = VoiceAnalyzer::new(&VoiceConfig::default());
    let window = tone(110.0, 0.03, 2048);

    let first = analyzer.analyze(0.0, &window);
    assert_eq!(first.emotion.emotion, Emotion::Sad);
    assert!(first.indicators.low_pitch > 0.0);
    assert!(first.indicators.low_energy > 0.0);
    assert_eq!(first.indicators.monotone, 0.0);

    analyzer.analyze(500.0, &window);
    let third = analyzer.analyze(1000.0, &window);
    assert!(third.indicators.monotone > 0.99);
    assert!(third.indicators.overall > first.indicators.overall);

    analyzer.reset();
    assert_eq!(analyzer.analyze(1500.0, &window).indicators.monotone, 0.0);
}

#[test]
fn test_silence_is_neutral_with_low_energy() {
    let mut analyzer = VoiceAnalyzer::new(&VoiceConfig::default());
    let result = analyzer.analyze(0.0, &vec![0.0; 2048]);
    assert_eq!(result.emotion.emotion, Emotion::Neutral);
    assert_eq!(result.indicators.low_energy, 1.0);
    assert_eq!(result.indicators.low_pitch, 0.0);
    assert!((result.indicators.overall - 1.0 / 3.0).abs() < 1e-12);
}
