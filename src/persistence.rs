//! Geometry persistence across missed detections.
//!
//! A fresh detection stores the geometry at full confidence. Each missed
//! frame multiplies the confidence by `decay`; once it reaches `floor`
//! the geometry is dropped and `None` is returned until the next detection.

use crate::{landmarks::Landmark, Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Per-frame confidence multiplier on a missed detection, in (0, 1)
    pub decay: f64,
    /// Confidence below which geometry is dropped, in [0, 1]
    pub floor: f64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            decay: crate::constants::DEFAULT_PERSISTENCE_DECAY,
            floor: crate::constants::DEFAULT_PERSISTENCE_FLOOR,
        }
    }
}

impl PersistenceConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when `decay` is outside (0, 1) or
    /// `floor` is outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(Error::ConfigError(format!(
                "persistence.decay must be in (0, 1), got {}",
                self.decay
            )));
        }
        if !(0.0..=1.0).contains(&self.floor) {
            return Err(Error::ConfigError(format!(
                "persistence.floor must be in [0, 1], got {}",
                self.floor
            )));
        }
        Ok(())
    }

    /// Consecutive missed frames until geometry is dropped,
    /// `ceil(ln(floor) / ln(decay))`. `None` when it never drops.
    #[must_use]
    pub fn frames_until_drop(&self) -> Option<u32> {
        if self.floor <= 0.0 {
            return None;
        }
        let frames = (self.floor.ln() / self.decay.ln()).ceil();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(frames.max(1.0) as u32)
    }
}

/// Geometry handed to the rest of the frame chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedGeometry {
    pub landmarks: Vec<Landmark>,
    /// 1.0 on a fresh detection, decaying on misses
    pub confidence: f64,
    /// Consecutive missed frames behind this geometry
    pub missed_frames: u32,
}

impl PersistedGeometry {
    /// Whether this geometry comes from the current frame's detection
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.missed_frames == 0
    }
}

/// Bridges short detection gaps with decaying confidence
#[derive(Debug, Clone)]
pub struct GeometryPersistence {
    config: PersistenceConfig,
    landmarks: Option<Vec<Landmark>>,
    confidence: f64,
    missed_frames: u32,
}

impl GeometryPersistence {
    #[must_use]
    pub fn new(config: PersistenceConfig) -> Self {
        Self {
            config,
            landmarks: None,
            confidence: 0.0,
            missed_frames: 0,
        }
    }

    /// Feed this frame's landmarks (`None` or empty for no detection)
    pub fn update(&mut self, current: Option<&[Landmark]>) -> Option<PersistedGeometry> {
        match current {
            Some(landmarks) if !landmarks.is_empty() => {
                self.landmarks = Some(landmarks.to_vec());
                self.confidence = 1.0;
                self.missed_frames = 0;
            }
            _ => {
                self.landmarks.as_ref()?;
                self.confidence *= self.config.decay;
                self.missed_frames += 1;
                if self.config.floor > 0.0 && self.confidence <= self.config.floor {
                    info!(
                        "Dropping persisted geometry after {} missed frames",
                        self.missed_frames
                    );
                    self.reset();
                    return None;
                }
                debug!(
                    "No detection, holding geometry at confidence {:.3}",
                    self.confidence
                );
            }
        }

        self.landmarks.as_ref().map(|landmarks| PersistedGeometry {
            landmarks: landmarks.clone(),
            confidence: self.confidence,
            missed_frames: self.missed_frames,
        })
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn has_geometry(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Forget stored geometry and confidence
    pub fn reset(&mut self) {
        self.landmarks = None;
        self.confidence = 0.0;
        self.missed_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face() -> Vec<Landmark> {
        vec![Landmark::new(0.1, 0.2), Landmark::new(0.3, 0.4)]
    }

    #[test]
    fn test_fresh_detection_has_full_confidence() {
        let mut persistence = GeometryPersistence::new(PersistenceConfig::default());
        let geometry = persistence.update(Some(&face())).unwrap();
        assert_eq!(geometry.confidence, 1.0);
        assert!(geometry.is_fresh());
        assert_eq!(geometry.landmarks, face());
    }

    #[test]
    fn test_decay_on_missed_frames() {
        let mut persistence = GeometryPersistence::new(PersistenceConfig::default());
        persistence.update(Some(&face()));

        let held = persistence.update(None).unwrap();
        assert!((held.confidence - 0.95).abs() < 1e-12);
        assert_eq!(held.missed_frames, 1);
        assert_eq!(held.landmarks, face());

        let held = persistence.update(Some(&[])).unwrap();
        assert!((held.confidence - 0.9025).abs() < 1e-12);
    }

    #[test]
    fn test_drop_after_exact_frame_count() {
        let config = PersistenceConfig::default();
        let expected = config.frames_until_drop().unwrap();
        assert_eq!(expected, 24);

        let mut persistence = GeometryPersistence::new(config);
        persistence.update(Some(&face()));
        for _ in 1..expected {
            assert!(persistence.update(None).is_some());
        }
        assert!(persistence.update(None).is_none());
        assert!(!persistence.has_geometry());
        assert!(persistence.update(None).is_none());
    }

    #[test]
    fn test_drop_when_confidence_lands_on_floor() {
        let config = PersistenceConfig { decay: 0.5, floor: 0.25 };
        assert_eq!(config.frames_until_drop(), Some(2));

        let mut persistence = GeometryPersistence::new(config);
        persistence.update(Some(&face()));
        let held = persistence.update(None).unwrap();
        assert_eq!(held.confidence, 0.5);
        assert!(persistence.update(None).is_none());
    }

    #[test]
    fn test_unit_floor_drops_on_first_miss() {
        let config = PersistenceConfig { decay: 0.95, floor: 1.0 };
        assert_eq!(config.frames_until_drop(), Some(1));

        let mut persistence = GeometryPersistence::new(config);
        persistence.update(Some(&face()));
        assert!(persistence.update(None).is_none());
    }

    #[test]
    fn test_redetection_restores_confidence() {
        let mut persistence = GeometryPersistence::new(PersistenceConfig::default());
        persistence.update(Some(&face()));
        persistence.update(None);
        persistence.update(None);
        let geometry = persistence.update(Some(&face())).unwrap();
        assert_eq!(geometry.confidence, 1.0);
    }

    #[test]
    fn test_nothing_before_first_detection() {
        let mut persistence = GeometryPersistence::new(PersistenceConfig::default());
        assert!(persistence.update(None).is_none());
    }

    #[test]
    fn test_reset() {
        let mut persistence = GeometryPersistence::new(PersistenceConfig::default());
        persistence.update(Some(&face()));
        persistence.reset();
        assert!(!persistence.has_geometry());
        assert_eq!(persistence.confidence(), 0.0);
        assert!(persistence.update(None).is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(PersistenceConfig::default().validate().is_ok());
        assert!(PersistenceConfig { decay: 1.0, floor: 0.3 }.validate().is_err());
        assert!(PersistenceConfig { decay: 0.0, floor: 0.3 }.validate().is_err());
        assert!(PersistenceConfig { decay: 0.9, floor: 1.2 }.validate().is_err());
    }
}
