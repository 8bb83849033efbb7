//! Voice analysis: acoustic features, emotion classification and prosodic
//! depression indicators.
//!
//! The voice chain runs on its own cadence (one call per audio window) and
//! is independent of the facial chain until fusion.

/// Pitch, energy, zero-crossing rate and spectral centroid
pub mod features;

/// Threshold-ladder emotion classifier
pub mod classifier;

/// Low pitch, low energy and monotone indicators
pub mod indicators;

use crate::{emotion::EmotionEstimate, Error, Result};
use classifier::{VoiceClassifierConfig, VoiceEmotionClassifier};
use features::{VoiceFeatureExtractor, VoiceFeatures};
use indicators::{IndicatorConfig, VoiceDepressionIndicators, VoiceIndicators};
use log::trace;
use serde::{Deserialize, Serialize};

/// Voice chain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Input sample rate (Hz); audio is assumed mono
    pub sample_rate: u32,
    /// Pitch search range (Hz)
    pub min_pitch_hz: f64,
    pub max_pitch_hz: f64,
    /// RMS multiplier before clamping energy to [0, 1]
    pub energy_gain: f64,
    /// Minimum normalised autocorrelation for a voiced window
    pub voicing_threshold: f64,
    pub classifier: VoiceClassifierConfig,
    pub indicators: IndicatorConfig,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::constants::DEFAULT_SAMPLE_RATE,
            min_pitch_hz: crate::constants::DEFAULT_MIN_PITCH_HZ,
            max_pitch_hz: crate::constants::DEFAULT_MAX_PITCH_HZ,
            energy_gain: 4.0,
            voicing_threshold: 0.3,
            classifier: VoiceClassifierConfig::default(),
            indicators: IndicatorConfig::default(),
        }
    }
}

impl VoiceConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for a zero sample rate, an empty or
    /// negative pitch range, a pitch range above Nyquist, or non-positive
    /// gain and indicator spans.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::ConfigError("voice.sample_rate must be positive".to_string()));
        }
        if !(self.min_pitch_hz > 0.0 && self.min_pitch_hz < self.max_pitch_hz) {
            return Err(Error::ConfigError(format!(
                "voice pitch range must satisfy 0 < min < max, got {}..{}",
                self.min_pitch_hz, self.max_pitch_hz
            )));
        }
        if self.max_pitch_hz > f64::from(self.sample_rate) / 2.0 {
            return Err(Error::ConfigError(format!(
                "voice.max_pitch_hz ({}) exceeds Nyquist for {} Hz",
                self.max_pitch_hz, self.sample_rate
            )));
        }
        if !self.energy_gain.is_finite() || self.energy_gain <= 0.0 {
            return Err(Error::ConfigError(format!(
                "voice.energy_gain must be positive, got {}",
                self.energy_gain
            )));
        }
        if !(0.0..=1.0).contains(&self.voicing_threshold) {
            return Err(Error::ConfigError(format!(
                "voice.voicing_threshold must be in [0, 1], got {}",
                self.voicing_threshold
            )));
        }
        let ind = &self.indicators;
        if !(ind.low_pitch_span_hz > 0.0 && ind.low_energy > 0.0 && ind.monotone_std_hz > 0.0) {
            return Err(Error::ConfigError(
                "voice.indicators spans and thresholds must be positive".to_string(),
            ));
        }
        if ind.pitch_window < 2 {
            return Err(Error::ConfigError(format!(
                "voice.indicators.pitch_window must be at least 2, got {}",
                ind.pitch_window
            )));
        }
        Ok(())
    }
}

/// Outcome of one audio window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceResult {
    pub timestamp_ms: f64,
    pub features: VoiceFeatures,
    pub emotion: EmotionEstimate,
    pub indicators: VoiceIndicators,
}

/// Runs extraction, classification and indicator tracking per window
pub struct VoiceAnalyzer {
    extractor: VoiceFeatureExtractor,
    classifier: VoiceEmotionClassifier,
    indicators: VoiceDepressionIndicators,
}

impl VoiceAnalyzer {
    #[must_use]
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            extractor: VoiceFeatureExtractor::new(config),
            classifier: VoiceEmotionClassifier::new(config.classifier.clone()),
            indicators: VoiceDepressionIndicators::new(config.indicators.clone()),
        }
    }

    pub fn analyze(&mut self, timestamp_ms: f64, samples: &[f32]) -> VoiceResult {
        let features = self.extractor.extract(samples);
        let emotion = self.classifier.classify(&features);
        let indicators = self.indicators.update(&features);
        trace!("Voice window at {timestamp_ms} ms: {features:?} -> {emotion:?}");
        VoiceResult {
            timestamp_ms,
            features,
            emotion,
            indicators,
        }
    }

    pub fn reset(&mut self) {
        self.indicators.reset();
    }
}
