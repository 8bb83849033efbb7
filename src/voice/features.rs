//! Time- and frequency-domain features of a mono audio window.

use super::VoiceConfig;
use log::debug;
use ndarray::{s, Array1};
use num_complex::Complex32;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Shortest window that is analysed at all
pub const MIN_WINDOW_SAMPLES: usize = 64;

/// Acoustic features of one analysis window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceFeatures {
    /// Fundamental frequency, 0 when unvoiced
    pub pitch_hz: f64,
    /// Scaled RMS energy in [0, 1]
    pub energy: f64,
    /// Sign changes per sample
    pub zero_crossing_rate: f64,
    pub spectral_centroid_hz: f64,
}

impl VoiceFeatures {
    #[must_use]
    pub fn is_voiced(&self) -> bool {
        self.pitch_hz > 0.0
    }
}

/// Extracts [`VoiceFeatures`] from sample buffers
pub struct VoiceFeatureExtractor {
    sample_rate: u32,
    min_pitch_hz: f64,
    max_pitch_hz: f64,
    energy_gain: f64,
    voicing_threshold: f64,
    fft_planner: FftPlanner<f32>,
}

impl VoiceFeatureExtractor {
    #[must_use]
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            min_pitch_hz: config.min_pitch_hz,
            max_pitch_hz: config.max_pitch_hz,
            energy_gain: config.energy_gain,
            voicing_threshold: config.voicing_threshold,
            fft_planner: FftPlanner::new(),
        }
    }

    /// Analyse one window of samples in [-1, 1]. Windows shorter than
    /// [`MIN_WINDOW_SAMPLES`] yield all-zero features.
    pub fn extract(&mut self, samples: &[f32]) -> VoiceFeatures {
        if samples.len() < MIN_WINDOW_SAMPLES {
            debug!("Audio window too short: {} samples", samples.len());
            return VoiceFeatures::default();
        }

        let signal: Array1<f32> = samples
            .iter()
            .map(|&v| if v.is_finite() { v } else { 0.0 })
            .collect();

        VoiceFeatures {
            pitch_hz: self.pitch(&signal),
            energy: self.energy(&signal),
            zero_crossing_rate: zero_crossing_rate(&signal),
            spectral_centroid_hz: self.spectral_centroid(&signal),
        }
    }

    /// Autocorrelation pitch over the configured period range
    fn pitch(&self, signal: &Array1<f32>) -> f64 {
        let n = signal.len();
        let mean = signal.mean().unwrap_or(0.0);
        let centered = signal - mean;

        let r0 = f64::from(centered.dot(&centered));
        if r0 <= f64::EPSILON {
            return 0.0;
        }

        let sr = f64::from(self.sample_rate);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let min_lag = ((sr / self.max_pitch_hz).floor() as usize).max(1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_lag = ((sr / self.min_pitch_hz).ceil() as usize).min(n - 1);
        if min_lag >= max_lag {
            return 0.0;
        }

        let (best_lag, best_r) = (min_lag..=max_lag)
            .map(|lag| {
                let r = centered.slice(s![..n - lag]).dot(&centered.slice(s![lag..]));
                (lag, f64::from(r) / r0)
            })
            .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });

        if best_r < self.voicing_threshold || best_lag == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pitch = sr / best_lag as f64;
        pitch
    }

    fn energy(&self, signal: &Array1<f32>) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let rms = (f64::from(signal.dot(signal)) / signal.len() as f64).sqrt();
        (rms * self.energy_gain).clamp(0.0, 1.0)
    }

    /// Magnitude-weighted mean frequency of the Hamming-windowed spectrum
    fn spectral_centroid(&mut self, signal: &Array1<f32>) -> f64 {
        let n = signal.len();

        #[allow(clippy::cast_precision_loss)]
        let mut buffer: Vec<Complex32> = signal
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let window = 0.54 - 0.46 * (2.0 * PI * i as f32 / (n - 1) as f32).cos();
                Complex32::new(s * window, 0.0)
            })
            .collect();

        let fft = self.fft_planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        #[allow(clippy::cast_precision_loss)]
        let bin_hz = f64::from(self.sample_rate) / n as f64;
        let (weighted, total) = buffer[..n / 2]
            .iter()
            .enumerate()
            .fold((0.0f64, 0.0f64), |(w, t), (k, c)| {
                let magnitude = f64::from(c.norm());
                #[allow(clippy::cast_precision_loss)]
                let freq = k as f64 * bin_hz;
                (w + freq * magnitude, t + magnitude)
            });

        if total <= f64::EPSILON {
            0.0
        } else {
            weighted / total
        }
    }
}

fn zero_crossing_rate(signal: &Array1<f32>) -> f64 {
    let crossings = signal
        .iter()
        .zip(signal.iter().skip(1))
        .filter(|(a, b)| (**a >= 0.0) != (**b >= 0.0))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let rate = crossings as f64 / signal.len() as f64;
    rate
}
