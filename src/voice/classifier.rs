//! Threshold-ladder voice emotion classifier.

use super::features::VoiceFeatures;
use crate::emotion::{Emotion, EmotionEstimate};
use serde::{Deserialize, Serialize};

/// Ladder thresholds and per-rule confidences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceClassifierConfig {
    pub surprised_min_pitch_hz: f64,
    pub surprised_min_energy: f64,
    pub surprised_confidence: f64,

    pub angry_min_energy: f64,
    pub angry_min_centroid_hz: f64,
    pub angry_confidence: f64,

    pub happy_min_pitch_hz: f64,
    pub happy_min_energy: f64,
    pub happy_confidence: f64,

    pub fearful_min_pitch_hz: f64,
    pub fearful_max_energy: f64,
    pub fearful_min_zcr: f64,
    pub fearful_confidence: f64,

    pub sad_max_pitch_hz: f64,
    pub sad_max_energy: f64,
    pub sad_confidence: f64,

    pub neutral_confidence: f64,
}

impl Default for VoiceClassifierConfig {
    fn default() -> Self {
        Self {
            surprised_min_pitch_hz: 300.0,
            surprised_min_energy: 0.5,
            surprised_confidence: 0.7,
            angry_min_energy: 0.6,
            angry_min_centroid_hz: 2000.0,
            angry_confidence: 0.75,
            happy_min_pitch_hz: 200.0,
            happy_min_energy: 0.3,
            happy_confidence: 0.7,
            fearful_min_pitch_hz: 220.0,
            fearful_max_energy: 0.3,
            fearful_min_zcr: 0.15,
            fearful_confidence: 0.6,
            sad_max_pitch_hz: 150.0,
            sad_max_energy: 0.2,
            sad_confidence: 0.7,
            neutral_confidence: 0.5,
        }
    }
}

/// Maps voice features onto an emotion; rules are tried in order
#[derive(Debug, Clone, Default)]
pub struct VoiceEmotionClassifier {
    config: VoiceClassifierConfig,
}

impl VoiceEmotionClassifier {
    #[must_use]
    pub fn new(config: VoiceClassifierConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn classify(&self, features: &VoiceFeatures) -> EmotionEstimate {
        let c = &self.config;
        let pitch = features.pitch_hz;
        let energy = features.energy;

        let (emotion, confidence) = if pitch > c.surprised_min_pitch_hz
            && energy > c.surprised_min_energy
        {
            (Emotion::Surprised, c.surprised_confidence)
        } else if energy > c.angry_min_energy && features.spectral_centroid_hz > c.angry_min_centroid_hz {
            (Emotion::Angry, c.angry_confidence)
        } else if pitch > c.happy_min_pitch_hz && energy > c.happy_min_energy {
            (Emotion::Happy, c.happy_confidence)
        } else if pitch > c.fearful_min_pitch_hz
            && energy <= c.fearful_max_energy
            && features.zero_crossing_rate > c.fearful_min_zcr
        {
            (Emotion::Fearful, c.fearful_confidence)
        } else if pitch > 0.0 && pitch < c.sad_max_pitch_hz && energy < c.sad_max_energy {
            (Emotion::Sad, c.sad_confidence)
        } else {
            (Emotion::Neutral, c.neutral_confidence)
        };

        EmotionEstimate::new(emotion, confidence)
    }
}
