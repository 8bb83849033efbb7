//! Facial/voice emotion fusion.
//!
//! Agreement between the modalities boosts confidence. Disagreement is
//! settled by weighted confidence, with the winner discounted and the
//! conflict attached for the consumer to surface.

use crate::{
    emotion::{Emotion, EmotionEstimate},
    Error, Result,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to every modality conflict
pub const CONFLICT_REASON: &str = "possible emotional suppression or incongruence";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Weight of the facial modality in [0, 1]; voice gets the remainder
    pub facial_weight: f64,
    /// Added to the mean confidence when both modalities agree
    pub agreement_bonus: f64,
    /// Upper bound of an agreeing confidence
    pub agreement_cap: f64,
    /// Multiplier applied to the winner of a conflict
    pub conflict_discount: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            facial_weight: crate::constants::DEFAULT_FACIAL_WEIGHT,
            agreement_bonus: 0.2,
            agreement_cap: 0.95,
            conflict_discount: 0.9,
        }
    }
}

impl FusionConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when any field is outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("facial_weight", self.facial_weight),
            ("agreement_bonus", self.agreement_bonus),
            ("agreement_cap", self.agreement_cap),
            ("conflict_discount", self.conflict_discount),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!(
                    "fusion.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Which evidence produced a fused record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FusionSource {
    FacialOnly,
    VoiceOnly,
    Consistent,
    FacialDominant,
    VoiceDominant,
    NoSignal,
}

impl fmt::Display for FusionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FacialOnly => "facial-only",
            Self::VoiceOnly => "voice-only",
            Self::Consistent => "consistent",
            Self::FacialDominant => "facial-dominant",
            Self::VoiceDominant => "voice-dominant",
            Self::NoSignal => "no-signal",
        })
    }
}

/// Both raw emotions of a disagreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub facial: Emotion,
    pub voice: Emotion,
    pub reason: String,
}

/// Terminal output of the pipeline for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedEmotionRecord {
    pub emotion: Emotion,
    pub confidence: f64,
    pub source: FusionSource,
    /// False only when the modalities disagreed
    pub consistency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictDetail>,
}

/// Combines facial and voice emotion estimates
#[derive(Debug, Clone, Default)]
pub struct MultimodalFusionEngine {
    config: FusionConfig,
}

impl MultimodalFusionEngine {
    #[must_use]
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse a facial estimate with an optional voice estimate
    #[must_use]
    pub fn fuse(&self, facial: EmotionEstimate, voice: Option<EmotionEstimate>) -> FusedEmotionRecord {
        let Some(voice) = voice else {
            return passthrough(facial, FusionSource::FacialOnly);
        };
        let c = &self.config;

        if facial.emotion == voice.emotion {
            let confidence = (0.5 * facial.confidence + 0.5 * voice.confidence + c.agreement_bonus)
                .min(c.agreement_cap);
            return FusedEmotionRecord {
                emotion: facial.emotion,
                confidence,
                source: FusionSource::Consistent,
                consistency: true,
                conflict: None,
            };
        }

        let facial_score = facial.confidence * c.facial_weight;
        let voice_score = voice.confidence * (1.0 - c.facial_weight);
        let (winner, source) = if facial_score >= voice_score {
            (facial, FusionSource::FacialDominant)
        } else {
            (voice, FusionSource::VoiceDominant)
        };
        debug!(
            "Modality conflict: facial {} ({:.2}) vs voice {} ({:.2}), {source}",
            facial.emotion, facial_score, voice.emotion, voice_score
        );

        FusedEmotionRecord {
            emotion: winner.emotion,
            confidence: winner.confidence * c.conflict_discount,
            source,
            consistency: false,
            conflict: Some(ConflictDetail {
                facial: facial.emotion,
                voice: voice.emotion,
                reason: CONFLICT_REASON.to_string(),
            }),
        }
    }

    /// Fuse when either modality may be missing
    #[must_use]
    pub fn fuse_optional(
        &self,
        facial: Option<EmotionEstimate>,
        voice: Option<EmotionEstimate>,
    ) -> FusedEmotionRecord {
        match (facial, voice) {
            (Some(facial), voice) => self.fuse(facial, voice),
            (None, Some(voice)) => passthrough(voice, FusionSource::VoiceOnly),
            (None, None) => FusedEmotionRecord {
                emotion: Emotion::Neutral,
                confidence: 0.0,
                source: FusionSource::NoSignal,
                consistency: true,
                conflict: None,
            },
        }
    }
}

fn passthrough(estimate: EmotionEstimate, source: FusionSource) -> FusedEmotionRecord {
    FusedEmotionRecord {
        emotion: estimate.emotion,
        confidence: estimate.confidence,
        source,
        consistency: true,
        conflict: None,
    }
}
