//! Landmark smoothing filters.
//!
//! This module provides per-point filters that remove frame-to-frame jitter
//! from raw landmark coordinates before any geometry is measured.

/// Per-point constant-position Kalman filter bank
pub mod kalman;

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::{landmarks::Landmark, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for all landmark filters
pub trait LandmarkFilter: Send + Sync {
    /// Smooth one frame of landmarks. A change in point count re-initialises
    /// the filter state and passes the frame through.
    fn apply(&mut self, landmarks: &[Landmark]) -> Vec<Landmark>;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl LandmarkFilter for NoFilter {
    fn apply(&mut self, landmarks: &[Landmark]) -> Vec<Landmark> {
        landmarks.to_vec()
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Available smoother implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmootherKind {
    #[default]
    Kalman,
    Exponential,
    None,
}

impl FromStr for SmootherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "kalman" => Ok(Self::Kalman),
            "exponential" | "ema" => Ok(Self::Exponential),
            "none" | "nofilter" => Ok(Self::None),
            _ => Err(Error::ConfigError(format!("Unknown smoother type: {s}"))),
        }
    }
}

impl fmt::Display for SmootherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kalman => "kalman",
            Self::Exponential => "exponential",
            Self::None => "none",
        })
    }
}

/// Smoother selection and parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    pub kind: SmootherKind,
    /// Kalman variance growth per frame
    pub process_noise: f64,
    /// Kalman measurement variance
    pub measurement_noise: f64,
    /// Exponential smoothing factor in (0, 1]
    pub exponential_alpha: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            kind: SmootherKind::Kalman,
            process_noise: crate::constants::DEFAULT_PROCESS_NOISE,
            measurement_noise: crate::constants::DEFAULT_MEASUREMENT_NOISE,
            exponential_alpha: crate::constants::DEFAULT_EXPONENTIAL_ALPHA,
        }
    }
}

impl SmootherConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for a negative process noise, a
    /// non-positive measurement noise or an alpha outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if !self.process_noise.is_finite() || self.process_noise < 0.0 {
            return Err(Error::ConfigError(format!(
                "smoother.process_noise must be non-negative, got {}",
                self.process_noise
            )));
        }
        if !self.measurement_noise.is_finite() || self.measurement_noise <= 0.0 {
            return Err(Error::ConfigError(format!(
                "smoother.measurement_noise must be positive, got {}",
                self.measurement_noise
            )));
        }
        if !(self.exponential_alpha > 0.0 && self.exponential_alpha <= 1.0) {
            return Err(Error::ConfigError(format!(
                "smoother.exponential_alpha must be in (0, 1], got {}",
                self.exponential_alpha
            )));
        }
        Ok(())
    }
}

/// Create a landmark filter from its configuration
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if the parameters are invalid.
pub fn create_filter(config: &SmootherConfig) -> Result<Box<dyn LandmarkFilter>> {
    config.validate()?;
    Ok(match config.kind {
        SmootherKind::None => Box::new(NoFilter),
        SmootherKind::Kalman => Box::new(kalman::KalmanSmoother::new(
            config.process_noise,
            config.measurement_noise,
        )),
        SmootherKind::Exponential => {
            Box::new(exponential::ExponentialFilter::new(config.exponential_alpha))
        }
    })
}
