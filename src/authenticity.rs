//! Smile authenticity analysis.
//!
//! A genuine (Duchenne) smile recruits the cheek raiser (AU6) alongside the
//! lip corner puller (AU12); a posed smile tends to move the mouth alone or
//! unevenly. The verdict is an ordered rule ladder over AU6, AU12, their
//! ratio and the left/right mouth-corner asymmetry.

use crate::{
    action_units::{ActionUnitExtractor, AuId, AuVector},
    landmarks::Landmark,
    utils::safe_ratio,
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Thresholds and confidences of the authenticity ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticityConfig {
    /// AU6 and AU12 must both exceed this for a Duchenne smile
    pub duchenne_min_intensity: f64,
    /// Minimum AU6/AU12 ratio for a Duchenne smile
    pub duchenne_min_ratio: f64,
    /// Maximum asymmetry for a Duchenne smile
    pub duchenne_max_asymmetry: f64,
    pub duchenne_confidence: f64,

    /// AU12 above this counts as an active smile in the fake rules
    pub smile_min_intensity: f64,
    /// AU6 below this means no eye involvement
    pub no_eye_max_au6: f64,
    pub no_eye_confidence: f64,

    /// AU6/AU12 ratio below this means too little co-activation
    pub low_ratio_max: f64,
    pub low_ratio_confidence: f64,

    /// Asymmetry above this alone marks a smile as posed
    pub asymmetric_min: f64,
    pub asymmetric_confidence: f64,

    pub ambiguous_confidence: f64,
}

impl Default for AuthenticityConfig {
    fn default() -> Self {
        Self {
            duchenne_min_intensity: 2.0,
            duchenne_min_ratio: 0.6,
            duchenne_max_asymmetry: 0.3,
            duchenne_confidence: 0.9,
            smile_min_intensity: 2.0,
            no_eye_max_au6: 1.0,
            no_eye_confidence: 0.85,
            low_ratio_max: 0.3,
            low_ratio_confidence: 0.75,
            asymmetric_min: 0.5,
            asymmetric_confidence: 0.7,
            ambiguous_confidence: 0.5,
        }
    }
}

impl AuthenticityConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for negative thresholds or confidences
    /// outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("duchenne_min_intensity", self.duchenne_min_intensity),
            ("duchenne_min_ratio", self.duchenne_min_ratio),
            ("duchenne_max_asymmetry", self.duchenne_max_asymmetry),
            ("smile_min_intensity", self.smile_min_intensity),
            ("no_eye_max_au6", self.no_eye_max_au6),
            ("low_ratio_max", self.low_ratio_max),
            ("asymmetric_min", self.asymmetric_min),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "authenticity.{name} must be non-negative, got {value}"
                )));
            }
        }

        let confidences = [
            ("duchenne_confidence", self.duchenne_confidence),
            ("no_eye_confidence", self.no_eye_confidence),
            ("low_ratio_confidence", self.low_ratio_confidence),
            ("asymmetric_confidence", self.asymmetric_confidence),
            ("ambiguous_confidence", self.ambiguous_confidence),
        ];
        for (name, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!(
                    "authenticity.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Which ladder rule produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticityRule {
    Duchenne,
    NoEyeInvolvement,
    LowCoActivation,
    Asymmetric,
    Ambiguous,
}

impl AuthenticityRule {
    /// Human-readable rationale
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Duchenne => "genuine Duchenne smile: cheek raise accompanies lip corner pull",
            Self::NoEyeInvolvement => "posed smile: mouth activates without eye involvement",
            Self::LowCoActivation => "posed smile: insufficient eye and mouth co-activation",
            Self::Asymmetric => "posed smile: left/right mouth-corner imbalance",
            Self::Ambiguous => "no clear smile signature",
        }
    }
}

/// Per-frame authenticity verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticityVerdict {
    pub is_duchenne: bool,
    pub is_genuine: bool,
    pub confidence: f64,
    /// Mouth-corner asymmetry in [0, 1]
    pub asymmetry: f64,
    /// AU6 / AU12
    pub ratio: f64,
    pub rule: AuthenticityRule,
    pub reason: String,
}

impl AuthenticityVerdict {
    /// Whether the verdict flags a posed smile
    #[must_use]
    pub fn is_fake_smile(&self) -> bool {
        matches!(
            self.rule,
            AuthenticityRule::NoEyeInvolvement
                | AuthenticityRule::LowCoActivation
                | AuthenticityRule::Asymmetric
        )
    }
}

/// Classifies smiles as genuine or posed
#[derive(Debug, Clone)]
pub struct ExpressionAuthenticityAnalyzer {
    extractor: ActionUnitExtractor,
    config: AuthenticityConfig,
}

impl ExpressionAuthenticityAnalyzer {
    #[must_use]
    pub fn new(extractor: ActionUnitExtractor, config: AuthenticityConfig) -> Self {
        Self { extractor, config }
    }

    /// Extract AUs and asymmetry from `landmarks` and judge them
    #[must_use]
    pub fn analyze(&self, landmarks: &[Landmark]) -> AuthenticityVerdict {
        let aus = self.extractor.extract(landmarks);
        self.judge(&aus, self.extractor.mouth_asymmetry(landmarks))
    }

    /// Judge an already extracted AU vector with a known asymmetry
    #[must_use]
    pub fn judge(&self, aus: &AuVector, asymmetry: f64) -> AuthenticityVerdict {
        let c = &self.config;
        let au6 = aus.get(AuId::Au6);
        let au12 = aus.get(AuId::Au12);
        let ratio = safe_ratio(au6, au12);
        let asymmetry = if asymmetry.is_finite() { asymmetry.clamp(0.0, 1.0) } else { 0.0 };

        let smiling = au12 > c.smile_min_intensity;
        let (rule, confidence) = if au6 > c.duchenne_min_intensity
            && au12 > c.duchenne_min_intensity
            && ratio > c.duchenne_min_ratio
            && asymmetry < c.duchenne_max_asymmetry
        {
            (AuthenticityRule::Duchenne, c.duchenne_confidence)
        } else if smiling && au6 < c.no_eye_max_au6 {
            (AuthenticityRule::NoEyeInvolvement, c.no_eye_confidence)
        } else if smiling && ratio < c.low_ratio_max {
            (AuthenticityRule::LowCoActivation, c.low_ratio_confidence)
        } else if asymmetry > c.asymmetric_min {
            (AuthenticityRule::Asymmetric, c.asymmetric_confidence)
        } else {
            (AuthenticityRule::Ambiguous, c.ambiguous_confidence)
        };

        let is_duchenne = rule == AuthenticityRule::Duchenne;
        AuthenticityVerdict {
            is_duchenne,
            is_genuine: is_duchenne,
            confidence,
            asymmetry,
            ratio,
            rule,
            reason: rule.reason().to_string(),
        }
    }
}
