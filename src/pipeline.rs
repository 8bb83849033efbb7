//! The per-session affect pipeline.
//!
//! One [`AffectPipeline`] owns every stateful component for one camera and
//! microphone session. Face frames run the full chain synchronously:
//! smoothing, persistence, AU extraction, then authenticity,
//! micro-expression and risk on the same AU vector, blink tracking on fresh
//! geometry, then fusion with the most recent voice result. Audio windows run the voice chain on their own
//! cadence and only update that latest voice result.

use crate::{
    action_units::{ActionUnitExtractor, AuVector},
    authenticity::{AuthenticityVerdict, ExpressionAuthenticityAnalyzer},
    blink::{BlinkReport, BlinkTracker},
    config::Config,
    emotion::{EmotionEstimate, FacialEmotionClassifier},
    filters::{create_filter, LandmarkFilter},
    fusion::{FusedEmotionRecord, FusionSource, MultimodalFusionEngine},
    landmarks::{LandmarkFrame, LandmarkLayout},
    micro_expression::{MicroExpressionDetector, MicroExpressionEvent},
    persistence::GeometryPersistence,
    risk::{DepressionRiskScorer, RiskLevel},
    voice::{VoiceAnalyzer, VoiceResult},
    Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Everything the pipeline produced for one face frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub timestamp_ms: f64,

    /// Confidence of the geometry used, `None` when no geometry was available
    pub geometry_confidence: Option<f64>,

    /// AU intensities; all zero without geometry
    pub action_units: AuVector,

    pub authenticity: Option<AuthenticityVerdict>,

    pub micro_expression: Option<MicroExpressionEvent>,

    /// Blink state, `None` unless the geometry is a fresh detection
    pub blink: Option<BlinkReport>,

    /// AU-based risk score, `None` without geometry
    pub risk_score: Option<u8>,

    /// Landmark-geometry risk score, `None` without geometry
    pub geometry_risk_score: Option<u8>,

    pub risk_level: Option<RiskLevel>,

    /// Facial estimate before fusion
    pub facial: Option<EmotionEstimate>,

    pub fused: FusedEmotionRecord,
}

/// One audio analysis window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioWindow {
    pub timestamp_ms: f64,
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,
}

/// A recorded input event, as read from a session file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    Face(LandmarkFrame),
    Audio(AudioWindow),
}

/// Counters over the life of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames: u64,
    pub frames_with_geometry: u64,
    pub audio_windows: u64,
    /// Frames fused with a voice result
    pub fused_with_voice: u64,
    pub consistent: u64,
    pub conflicts: u64,
    pub genuine_smiles: u64,
    pub fake_smiles: u64,
    pub micro_expressions: u64,
    pub blinks: u64,
    pub prolonged_closures: u64,
}

/// Owns and drives every component for one session
pub struct AffectPipeline {
    config: Config,
    layout: LandmarkLayout,
    smoother: Box<dyn LandmarkFilter>,
    persistence: GeometryPersistence,
    extractor: ActionUnitExtractor,
    authenticity: ExpressionAuthenticityAnalyzer,
    micro: MicroExpressionDetector,
    blink: BlinkTracker,
    risk: DepressionRiskScorer,
    facial_classifier: FacialEmotionClassifier,
    voice: VoiceAnalyzer,
    fusion: MultimodalFusionEngine,
    latest_voice: Option<VoiceResult>,
    stats: SessionStats,
}

impl AffectPipeline {
    /// Build a pipeline from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let layout = config.landmarks.layout()?;
        let index_map = config.landmarks.index_map()?;
        let extractor = ActionUnitExtractor::new(index_map.clone(), config.action_units);

        info!(
            "Affect pipeline: {} landmarks, {} smoother, facial weight {}",
            layout.point_count(),
            config.smoother.kind,
            config.fusion.facial_weight
        );

        Ok(Self {
            layout,
            smoother: create_filter(&config.smoother)?,
            persistence: GeometryPersistence::new(config.persistence.clone()),
            authenticity: ExpressionAuthenticityAnalyzer::new(
                extractor.clone(),
                config.authenticity.clone(),
            ),
            extractor,
            micro: MicroExpressionDetector::new(config.micro_expression.clone()),
            blink: BlinkTracker::new(config.blink.clone()),
            risk: DepressionRiskScorer::new(config.risk.clone(), index_map),
            facial_classifier: FacialEmotionClassifier::new(config.emotion.activation),
            voice: VoiceAnalyzer::new(&config.voice),
            fusion: MultimodalFusionEngine::new(config.fusion.clone()),
            latest_voice: None,
            stats: SessionStats::default(),
            config,
        })
    }

    /// Run the facial chain on one frame and fuse with the latest voice result
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameReport {
        self.stats.frames += 1;

        let geometry = if frame.is_present() {
            if frame.landmarks.len() != self.layout.point_count() {
                warn!(
                    "Frame at {} ms has {} landmarks, expected {}",
                    frame.timestamp_ms,
                    frame.landmarks.len(),
                    self.layout.point_count()
                );
            }
            let smoothed = self.smoother.apply(&frame.landmarks);
            self.persistence.update(Some(&smoothed))
        } else {
            self.persistence.update(None)
        };

        let voice = self.latest_voice.map(|v| v.emotion);

        let Some(geometry) = geometry else {
            debug!("No geometry at {} ms", frame.timestamp_ms);
            let fused = self.fusion.fuse_optional(None, voice);
            self.count_fusion(&fused);
            return FrameReport {
                timestamp_ms: frame.timestamp_ms,
                geometry_confidence: None,
                action_units: AuVector::default(),
                authenticity: None,
                micro_expression: None,
                blink: None,
                risk_score: None,
                geometry_risk_score: None,
                risk_level: None,
                facial: None,
                fused,
            };
        };
        self.stats.frames_with_geometry += 1;

        let landmarks = &geometry.landmarks;
        let aus = self.extractor.extract(landmarks);

        let verdict = self
            .authenticity
            .judge(&aus, self.extractor.mouth_asymmetry(landmarks));
        if verdict.is_genuine {
            self.stats.genuine_smiles += 1;
        } else if verdict.is_fake_smile() {
            self.stats.fake_smiles += 1;
        }

        self.micro.push(&aus);
        let micro_expression = self.micro.observe(frame.timestamp_ms);
        if micro_expression.is_some() {
            self.stats.micro_expressions += 1;
        }

        // Held geometry would stretch a closure over the missed frames
        let index_map = self.extractor.index_map();
        let blink = (geometry.is_fresh() && index_map.covers(landmarks))
            .then(|| self.blink.update(frame.timestamp_ms, index_map.mean_eye_aspect_ratio(landmarks)));
        if let Some(report) = &blink {
            if report.blink {
                self.stats.blinks += 1;
            }
            if report.prolonged_closure {
                self.stats.prolonged_closures += 1;
            }
        }

        let risk_score = self.risk.score(&aus);
        let geometry_risk_score = self.risk.score_landmarks(landmarks);

        // Detector scores only describe the current frame's detection
        let detected = geometry
            .is_fresh()
            .then(|| EmotionEstimate::from_scores(&frame.expression_scores))
            .flatten()
            .unwrap_or_else(|| self.facial_classifier.classify(&aus));
        let facial = EmotionEstimate::new(detected.emotion, detected.confidence * geometry.confidence);

        let fused = self.fusion.fuse_optional(Some(facial), voice);
        self.count_fusion(&fused);

        FrameReport {
            timestamp_ms: frame.timestamp_ms,
            geometry_confidence: Some(geometry.confidence),
            action_units: aus,
            authenticity: Some(verdict),
            micro_expression,
            blink,
            risk_score: Some(risk_score),
            geometry_risk_score: Some(geometry_risk_score),
            risk_level: Some(self.risk.level(risk_score)),
            facial: Some(facial),
            fused,
        }
    }

    /// Run the voice chain on one audio window; the result is used by every
    /// following frame until the next window arrives
    pub fn process_audio(&mut self, timestamp_ms: f64, samples: &[f32]) -> VoiceResult {
        self.stats.audio_windows += 1;
        let result = self.voice.analyze(timestamp_ms, samples);
        self.latest_voice = Some(result);
        result
    }

    /// Dispatch a recorded event; face events yield a report
    pub fn process_event(&mut self, event: &SessionEvent) -> Option<FrameReport> {
        match event {
            SessionEvent::Face(frame) => Some(self.process_frame(frame)),
            SessionEvent::Audio(window) => {
                self.process_audio(window.timestamp_ms, &window.samples);
                None
            }
        }
    }

    /// Discard all per-session state
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.persistence.reset();
        self.micro.reset();
        self.blink.reset();
        self.voice.reset();
        self.latest_voice = None;
        self.stats = SessionStats::default();
        info!("Affect pipeline reset");
    }

    fn count_fusion(&mut self, fused: &FusedEmotionRecord) {
        match fused.source {
            FusionSource::Consistent => {
                self.stats.fused_with_voice += 1;
                self.stats.consistent += 1;
            }
            FusionSource::FacialDominant | FusionSource::VoiceDominant => {
                self.stats.fused_with_voice += 1;
                self.stats.conflicts += 1;
            }
            FusionSource::FacialOnly | FusionSource::VoiceOnly | FusionSource::NoSignal => {}
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> LandmarkLayout {
        self.layout
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[must_use]
    pub fn latest_voice(&self) -> Option<&VoiceResult> {
        self.latest_voice.as_ref()
    }

    /// Name of the active smoother
    #[must_use]
    pub fn smoother_name(&self) -> &str {
        self.smoother.name()
    }

    /// Per-AU window statistics over the micro-expression history
    #[must_use]
    pub fn au_trends(&self) -> Option<crate::action_units::AuMap<crate::micro_expression::Statistics>> {
        self.micro.trends()
    }
}
