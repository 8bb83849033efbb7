//! Emotion labels and facial emotion estimation.

use crate::action_units::{AuId, AuVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Emotion classes shared by the facial and voice pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Surprised,
    Disgusted,
}

impl Emotion {
    pub const ALL: [Self; 7] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Fearful,
        Self::Surprised,
        Self::Disgusted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Fearful => "fearful",
            Self::Surprised => "surprised",
            Self::Disgusted => "disgusted",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emotion label with a confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionEstimate {
    pub emotion: Emotion,
    pub confidence: f64,
}

impl EmotionEstimate {
    #[must_use]
    pub fn new(emotion: Emotion, confidence: f64) -> Self {
        Self {
            emotion,
            confidence: if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    /// Neutral at the given confidence
    #[must_use]
    pub fn neutral(confidence: f64) -> Self {
        Self::new(Emotion::Neutral, confidence)
    }

    /// Arg-max over detector class scores. Ties keep the earlier class in
    /// [`Emotion::ALL`] order; empty or non-finite scores yield `None`.
    #[must_use]
    pub fn from_scores(scores: &BTreeMap<Emotion, f64>) -> Option<Self> {
        Emotion::ALL
            .iter()
            .filter_map(|e| scores.get(e).filter(|s| s.is_finite()).map(|s| (*e, *s)))
            .fold(None, |best: Option<(Emotion, f64)>, (e, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((e, s)),
            })
            .map(|(e, s)| Self::new(e, s))
    }
}

/// Rule-based facial emotion from an AU vector, used when the upstream
/// detector supplies no class scores.
///
/// Rules are checked in order; the first whose key AUs all exceed the
/// activation threshold wins, with confidence rising with their mean
/// intensity.
#[derive(Debug, Clone)]
pub struct FacialEmotionClassifier {
    activation: f64,
}

const FACIAL_RULES: [(Emotion, &[AuId]); 6] = [
    (Emotion::Surprised, &[AuId::Au1, AuId::Au2, AuId::Au26]),
    (Emotion::Fearful, &[AuId::Au1, AuId::Au2, AuId::Au5, AuId::Au20]),
    (Emotion::Happy, &[AuId::Au12]),
    (Emotion::Angry, &[AuId::Au4, AuId::Au7]),
    (Emotion::Sad, &[AuId::Au1, AuId::Au15]),
    (Emotion::Disgusted, &[AuId::Au9]),
];

impl FacialEmotionClassifier {
    #[must_use]
    pub fn new(activation: f64) -> Self {
        Self { activation }
    }

    #[must_use]
    pub fn classify(&self, aus: &AuVector) -> EmotionEstimate {
        for (emotion, keys) in FACIAL_RULES {
            if keys.iter().all(|au| aus.get(*au) > self.activation) {
                #[allow(clippy::cast_precision_loss)]
                let mean = keys.iter().map(|au| aus.get(*au)).sum::<f64>() / keys.len() as f64;
                return EmotionEstimate::new(emotion, (0.5 + mean / 10.0).min(0.9));
            }
        }
        EmotionEstimate::neutral(0.5)
    }
}

impl Default for FacialEmotionClassifier {
    fn default() -> Self {
        Self::new(2.0)
    }
}
