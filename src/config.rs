//! Configuration management for the affect pipeline

use crate::{
    action_units::{AuCalibration, AuId},
    authenticity::AuthenticityConfig,
    blink::BlinkConfig,
    filters::SmootherConfig,
    fusion::FusionConfig,
    landmarks::{CoordinateSpace, FaceIndexMap, LandmarkLayout},
    micro_expression::MicroExpressionConfig,
    persistence::PersistenceConfig,
    risk::RiskConfig,
    voice::VoiceConfig,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration, fixed for the lifetime of a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Landmark layout and coordinate space
    pub landmarks: LandmarkConfig,

    /// Landmark smoothing
    pub smoother: SmootherConfig,

    /// Geometry persistence across missed detections
    pub persistence: PersistenceConfig,

    /// Per-AU calibration ranges
    pub action_units: AuCalibration,

    /// AU-based facial emotion fallback
    pub emotion: EmotionConfig,

    /// Smile authenticity ladder
    pub authenticity: AuthenticityConfig,

    /// Micro-expression detection
    pub micro_expression: MicroExpressionConfig,

    /// Blink and eye-closure tracking
    pub blink: BlinkConfig,

    /// Risk scoring rules
    pub risk: RiskConfig,

    /// Voice chain
    pub voice: VoiceConfig,

    /// Multimodal fusion
    pub fusion: FusionConfig,
}

/// Landmark input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// 68 or 468
    pub point_count: usize,

    /// Coordinate space of incoming landmarks
    pub coordinate_space: CoordinateSpace,

    /// Replaces the layout's default anatomical index map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_map: Option<FaceIndexMap>,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            point_count: crate::constants::SPARSE_LANDMARK_COUNT,
            coordinate_space: CoordinateSpace::Normalized,
            index_map: None,
        }
    }
}

impl LandmarkConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidPointCount`] for a point count other than 68 or 468.
    pub fn layout(&self) -> Result<LandmarkLayout> {
        LandmarkLayout::from_point_count(self.point_count)
    }

    /// The override index map, or the layout default
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPointCount`] for an unsupported point count.
    pub fn index_map(&self) -> Result<FaceIndexMap> {
        match &self.index_map {
            Some(map) => Ok(map.clone()),
            None => Ok(self.layout()?.index_map()),
        }
    }
}

/// AU-based facial emotion fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// AU intensity above which a rule's key AU counts as active
    pub activation: f64,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self { activation: 2.0 }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Serialize configuration to YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::SerializationError(format!("Failed to serialize config: {e}")))
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        let layout = self.landmarks.layout()?;
        if let Some(map) = &self.landmarks.index_map {
            if map.min_point_count() > layout.point_count() {
                return Err(Error::ConfigError(format!(
                    "Index map needs {} landmarks but point_count is {}",
                    map.min_point_count(),
                    layout.point_count()
                )));
            }
        }

        self.smoother.validate()?;
        self.persistence.validate()?;
        validate_calibration(&self.action_units)?;

        if !self.emotion.activation.is_finite() || self.emotion.activation < 0.0 {
            return Err(Error::ConfigError(format!(
                "emotion.activation must be non-negative, got {}",
                self.emotion.activation
            )));
        }

        self.authenticity.validate()?;
        self.micro_expression.validate()?;
        self.blink.validate()?;
        self.risk.validate()?;
        self.voice.validate()?;
        self.fusion.validate()?;

        Ok(())
    }
}

fn validate_calibration(calibration: &AuCalibration) -> Result<()> {
    for id in AuId::ALL {
        let range = calibration.get(id);
        if !(range.in_min.is_finite() && range.in_max.is_finite() && range.in_min < range.in_max) {
            return Err(Error::ConfigError(format!(
                "Calibration range for {id} must satisfy in_min < in_max, got {}..{}",
                range.in_min, range.in_max
            )));
        }
    }
    Ok(())
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Affect Pipeline Configuration
# Sections left out keep their defaults; `--print-config` shows every value.

# Landmark input
landmarks:
  point_count: 68
  coordinate_space: normalized

# Landmark smoothing (kalman, exponential, none)
smoother:
  kind: kalman
  process_noise: 0.01
  measurement_noise: 0.1
  exponential_alpha: 0.5

# Geometry persistence on missed detections
persistence:
  decay: 0.95
  floor: 0.3

# Smile authenticity ladder
authenticity:
  duchenne_min_intensity: 2.0
  duchenne_min_ratio: 0.6
  duchenne_max_asymmetry: 0.3
  asymmetric_min: 0.5

# Micro-expression detection
micro_expression:
  history_depth: 30
  min_gap_ms: 40.0
  max_gap_ms: 500.0
  rate_threshold: 10.0

# Blink and eye-closure tracking
blink:
  closed_ear: 0.21
  low_ear: 0.25
  min_blink_ms: 50.0
  max_blink_ms: 500.0
  rate_window_ms: 60000.0
  history_depth: 30

# Risk levels
risk:
  medium_from: 30
  high_from: 60

# Voice analysis
voice:
  sample_rate: 16000
  min_pitch_hz: 80.0
  max_pitch_hz: 400.0
  energy_gain: 4.0
  voicing_threshold: 0.3

# Multimodal fusion
fusion:
  facial_weight: 0.6
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_units::AuRange;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.landmarks.point_count, 68);
        assert_eq!(config.fusion.facial_weight, 0.6);
        assert_eq!(config.action_units, AuCalibration::default());
        assert_eq!(config.blink, BlinkConfig::default());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = Config::default();
        config.landmarks.point_count = 468;
        config.fusion.facial_weight = 0.7;
        let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed.landmarks.point_count, 468);
        assert_eq!(parsed.fusion.facial_weight, 0.7);
        assert_eq!(parsed.action_units, config.action_units);
    }

    #[test]
    fn test_invalid_point_count() {
        let mut config = Config::default();
        config.landmarks.point_count = 100;
        assert!(matches!(config.validate(), Err(Error::InvalidPointCount(100))));
    }

    #[test]
    fn test_index_map_override_must_fit() {
        let mut config = Config::default();
        config.landmarks.index_map = Some(FaceIndexMap::dense468());
        assert!(config.validate().is_err());

        config.landmarks.point_count = 468;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_calibration_range() {
        let mut config = Config::default();
        config.action_units.au12 = AuRange::ascending(0.2, 0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml("fusion: [1, 2"),
            Err(Error::ConfigError(_))
        ));
    }
}
