//! Heuristic depression-risk scoring.
//!
//! Two additive rule sets map either an AU vector or raw landmark geometry
//! onto a 0-100 score. The thresholds and weights are uncalibrated
//! heuristics kept as configuration; they are not clinical cut-offs.

use crate::{
    action_units::{AuId, AuVector},
    landmarks::{FaceIndexMap, Landmark},
    utils::safe_ratio,
    Error, Result,
};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rules applied to the AU vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuRiskRules {
    pub brow_lowerer_above: f64,
    pub brow_lowerer_points: u32,
    pub smile_below: f64,
    pub smile_points: u32,
    pub lip_depressor_above: f64,
    pub lip_depressor_points: u32,
    pub cheek_raise_below: f64,
    pub cheek_raise_points: u32,
    /// Both AU1 and AU2 below this
    pub brow_raise_below: f64,
    pub brow_raise_points: u32,
}

impl Default for AuRiskRules {
    fn default() -> Self {
        Self {
            brow_lowerer_above: 3.0,
            brow_lowerer_points: 20,
            smile_below: 1.0,
            smile_points: 25,
            lip_depressor_above: 3.0,
            lip_depressor_points: 25,
            cheek_raise_below: 1.0,
            cheek_raise_points: 15,
            brow_raise_below: 1.0,
            brow_raise_points: 15,
        }
    }
}

/// Rules applied directly to landmark ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryRiskRules {
    /// Mouth-corner drop relative to the lip centre, both measured from the
    /// nose tip
    pub mouth_droop_above: f64,
    pub mouth_droop_points: u32,
    /// Inner brow to upper eyelid distance in outer-canthus units
    pub brow_eye_below: f64,
    pub brow_eye_points: u32,
    /// Mean eye aspect ratio
    pub eye_openness_below: f64,
    pub eye_openness_points: u32,
    /// Vertical cheek offset in outer-canthus units
    pub cheek_asymmetry_above: f64,
    pub cheek_asymmetry_points: u32,
    /// Bridge-to-chin height over jaw width
    pub face_aspect_above: f64,
    pub face_aspect_points: u32,
}

impl Default for GeometryRiskRules {
    fn default() -> Self {
        Self {
            mouth_droop_above: 1.05,
            mouth_droop_points: 25,
            brow_eye_below: 0.18,
            brow_eye_points: 20,
            eye_openness_below: 0.22,
            eye_openness_points: 15,
            cheek_asymmetry_above: 0.05,
            cheek_asymmetry_points: 10,
            face_aspect_above: 1.05,
            face_aspect_points: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub au_rules: AuRiskRules,
    pub geometry_rules: GeometryRiskRules,
    /// Scores at or above this are at least medium risk
    pub medium_from: u8,
    /// Scores at or above this are high risk
    pub high_from: u8,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            au_rules: AuRiskRules::default(),
            geometry_rules: GeometryRiskRules::default(),
            medium_from: 30,
            high_from: 60,
        }
    }
}

impl RiskConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for negative thresholds or risk-level
    /// cut-offs that are out of order.
    pub fn validate(&self) -> Result<()> {
        let a = &self.au_rules;
        let g = &self.geometry_rules;
        for (name, value) in [
            ("au_rules.brow_lowerer_above", a.brow_lowerer_above),
            ("au_rules.smile_below", a.smile_below),
            ("au_rules.lip_depressor_above", a.lip_depressor_above),
            ("au_rules.cheek_raise_below", a.cheek_raise_below),
            ("au_rules.brow_raise_below", a.brow_raise_below),
            ("geometry_rules.mouth_droop_above", g.mouth_droop_above),
            ("geometry_rules.brow_eye_below", g.brow_eye_below),
            ("geometry_rules.eye_openness_below", g.eye_openness_below),
            ("geometry_rules.cheek_asymmetry_above", g.cheek_asymmetry_above),
            ("geometry_rules.face_aspect_above", g.face_aspect_above),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "risk.{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.medium_from > self.high_from || self.high_from > 100 {
            return Err(Error::ConfigError(format!(
                "risk level cut-offs must satisfy medium_from <= high_from <= 100, got {} and {}",
                self.medium_from, self.high_from
            )));
        }
        Ok(())
    }
}

/// Coarse risk band of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Raw landmark ratios behind the geometry rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryRatios {
    pub mouth_droop: f64,
    pub brow_eye: f64,
    pub eye_openness: f64,
    pub cheek_asymmetry: f64,
    pub face_aspect: f64,
}

/// Stateless additive risk scorer
#[derive(Debug, Clone)]
pub struct DepressionRiskScorer {
    config: RiskConfig,
    index_map: FaceIndexMap,
}

impl DepressionRiskScorer {
    #[must_use]
    pub fn new(config: RiskConfig, index_map: FaceIndexMap) -> Self {
        Self { config, index_map }
    }

    /// Score an AU vector
    #[must_use]
    pub fn score(&self, aus: &AuVector) -> u8 {
        let r = &self.config.au_rules;
        let rules = [
            (aus.get(AuId::Au4) > r.brow_lowerer_above, r.brow_lowerer_points),
            (aus.get(AuId::Au12) < r.smile_below, r.smile_points),
            (aus.get(AuId::Au15) > r.lip_depressor_above, r.lip_depressor_points),
            (aus.get(AuId::Au6) < r.cheek_raise_below, r.cheek_raise_points),
            (
                aus.get(AuId::Au1) < r.brow_raise_below && aus.get(AuId::Au2) < r.brow_raise_below,
                r.brow_raise_points,
            ),
        ];
        let score = accumulate(&rules);
        trace!("AU risk score {score}");
        score
    }

    /// Score raw landmarks; zero when the input is too short to measure
    #[must_use]
    pub fn score_landmarks(&self, landmarks: &[Landmark]) -> u8 {
        let Some(ratios) = self.geometry_ratios(landmarks) else {
            return 0;
        };
        let g = &self.config.geometry_rules;
        let rules = [
            (ratios.mouth_droop > g.mouth_droop_above, g.mouth_droop_points),
            (ratios.brow_eye < g.brow_eye_below, g.brow_eye_points),
            (ratios.eye_openness < g.eye_openness_below, g.eye_openness_points),
            (ratios.cheek_asymmetry > g.cheek_asymmetry_above, g.cheek_asymmetry_points),
            (ratios.face_aspect > g.face_aspect_above, g.face_aspect_points),
        ];
        let score = accumulate(&rules);
        trace!("Geometry risk score {score} from {ratios:?}");
        score
    }

    /// Landmark ratios used by [`Self::score_landmarks`]
    #[must_use]
    pub fn geometry_ratios(&self, landmarks: &[Landmark]) -> Option<GeometryRatios> {
        let m = &self.index_map;
        if !m.covers(landmarks) {
            return None;
        }
        let p = |i: usize| landmarks[i];
        let scale = m.inter_ocular(landmarks);
        let nose_y = p(m.nose_tip).y;

        let corners_y = (p(m.mouth_corners[0]).y + p(m.mouth_corners[1]).y) / 2.0;
        let lip_y = m.mouth_center(landmarks).y;
        let brow_eye = (p(m.eye_top[0]).y - p(m.brow_inner[0]).y + p(m.eye_top[1]).y
            - p(m.brow_inner[1]).y)
            / 2.0;

        Some(GeometryRatios {
            mouth_droop: safe_ratio(corners_y - nose_y, lip_y - nose_y),
            brow_eye: brow_eye / scale,
            eye_openness: m.mean_eye_aspect_ratio(landmarks),
            cheek_asymmetry: (p(m.cheeks[0]).y - p(m.cheeks[1]).y).abs() / scale,
            face_aspect: safe_ratio(
                p(m.chin).y - p(m.nose_bridge).y,
                p(m.jaw_sides[0]).distance(&p(m.jaw_sides[1])),
            ),
        })
    }

    /// Band of a 0-100 score
    #[must_use]
    pub fn level(&self, score: u8) -> RiskLevel {
        if score >= self.config.high_from {
            RiskLevel::High
        } else if score >= self.config.medium_from {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

fn accumulate(rules: &[(bool, u32)]) -> u8 {
    let total: u32 = rules
        .iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, points)| *points)
        .fold(0, u32::saturating_add);
    u8::try_from(total.min(100)).unwrap_or(100)
}
