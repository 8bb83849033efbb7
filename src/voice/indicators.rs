//! Prosodic depression indicators tracked across voice windows.

use super::features::VoiceFeatures;
use crate::utils::mean_std;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Pitch below this starts to count as low
    pub low_pitch_hz: f64,
    /// Pitch drop below `low_pitch_hz` that saturates the indicator
    pub low_pitch_span_hz: f64,
    /// Energy below this starts to count as low
    pub low_energy: f64,
    /// Pitch standard deviation below this starts to count as monotone
    pub monotone_std_hz: f64,
    /// Voiced windows kept for the monotone indicator
    pub pitch_window: usize,
    /// Voiced windows needed before monotony is judged
    pub min_voiced_windows: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            low_pitch_hz: 120.0,
            low_pitch_span_hz: 40.0,
            low_energy: 0.15,
            monotone_std_hz: 10.0,
            pitch_window: 20,
            min_voiced_windows: 3,
        }
    }
}

/// Indicator values, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceIndicators {
    pub low_pitch: f64,
    pub low_energy: f64,
    pub monotone: f64,
    /// Mean of the three indicators
    pub overall: f64,
}

/// Keeps recent voiced pitch values and scores each window
#[derive(Debug, Clone)]
pub struct VoiceDepressionIndicators {
    config: IndicatorConfig,
    pitches: VecDeque<f64>,
}

impl VoiceDepressionIndicators {
    #[must_use]
    pub fn new(config: IndicatorConfig) -> Self {
        let capacity = config.pitch_window;
        Self {
            config,
            pitches: VecDeque::with_capacity(capacity),
        }
    }

    pub fn update(&mut self, features: &VoiceFeatures) -> VoiceIndicators {
        let c = &self.config;

        if features.is_voiced() {
            if self.pitches.len() >= c.pitch_window {
                self.pitches.pop_front();
            }
            self.pitches.push_back(features.pitch_hz);
        }

        let low_pitch = if features.is_voiced() && features.pitch_hz < c.low_pitch_hz {
            unit((c.low_pitch_hz - features.pitch_hz) / c.low_pitch_span_hz)
        } else {
            0.0
        };

        let low_energy = if features.energy < c.low_energy {
            unit((c.low_energy - features.energy) / c.low_energy)
        } else {
            0.0
        };

        let monotone = if self.pitches.len() >= c.min_voiced_windows.max(2) {
            let values: Vec<f64> = self.pitches.iter().copied().collect();
            let (_, std) = mean_std(&values);
            if std < c.monotone_std_hz {
                unit((c.monotone_std_hz - std) / c.monotone_std_hz)
            } else {
                0.0
            }
        } else {
            0.0
        };

        VoiceIndicators {
            low_pitch,
            low_energy,
            monotone,
            overall: (low_pitch + low_energy + monotone) / 3.0,
        }
    }

    pub fn reset(&mut self) {
        self.pitches.clear();
    }
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
