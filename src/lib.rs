//! Real-time facial and vocal affect analysis.
//!
//! This library turns a noisy stream of facial landmark frames, and
//! optionally a parallel stream of audio windows, into a stable emotion and
//! depression-risk signal:
//! - per-point Kalman smoothing of landmark jitter
//! - confidence-decaying persistence across missed detections
//! - geometric Action Unit (AU) intensities on a 0-5 scale
//! - smile authenticity, micro-expression and risk heuristics
//! - blink rate and eye-closure tracking
//! - voice pitch/energy features and emotion classification
//! - confidence-weighted fusion of the two modalities
//!
//! All classification is deterministic and rule based. Per-frame operations
//! never fail; only configuration is validated, at construction.
//!
//! # Examples
//!
//! ## Processing Frames
//!
//! ```no_run
//! use affect_pipeline::{
//!     config::Config,
//!     landmarks::{neutral_face, LandmarkFrame, LandmarkLayout},
//!     pipeline::AffectPipeline,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = AffectPipeline::new(Config::default())?;
//!
//! // Landmarks come from an external detector, one frame per video frame
//! let frame = LandmarkFrame::detected(0.0, neutral_face(LandmarkLayout::Sparse68));
//! let report = pipeline.process_frame(&frame);
//! println!("{} ({:.2})", report.fused.emotion, report.fused.confidence);
//!
//! // A frame without a face keeps the last geometry at decaying confidence
//! let report = pipeline.process_frame(&LandmarkFrame::missing(33.0));
//! println!("geometry confidence: {:?}", report.geometry_confidence);
//! # Ok(())
//! # }
//! ```
//!
//! ## Adding Voice
//!
//! ```no_run
//! use affect_pipeline::{config::Config, pipeline::AffectPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = AffectPipeline::new(Config::default())?;
//!
//! // Mono samples at the configured sample rate (16 kHz by default)
//! let samples = vec![0.0f32; 8000];
//! let voice = pipeline.process_audio(0.0, &samples);
//! println!("pitch {:.0} Hz, voice emotion {}", voice.features.pitch_hz, voice.emotion.emotion);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Components Directly
//!
//! ```no_run
//! use affect_pipeline::{
//!     action_units::{ActionUnitExtractor, AuCalibration, AuId},
//!     landmarks::{neutral_face, LandmarkLayout},
//!     risk::{DepressionRiskScorer, RiskConfig},
//! };
//!
//! let layout = LandmarkLayout::Dense468;
//! let extractor = ActionUnitExtractor::new(layout.index_map(), AuCalibration::default());
//! let aus = extractor.extract(&neutral_face(layout));
//! println!("AU12 = {:.2}", aus.get(AuId::Au12));
//!
//! let scorer = DepressionRiskScorer::new(RiskConfig::default(), layout.index_map());
//! let score = scorer.score(&aus);
//! println!("risk {score} ({})", scorer.level(score));
//! ```

/// Landmark types, layouts and anatomical index maps
pub mod landmarks;

/// Landmark smoothing filters
pub mod filters;

/// Geometry persistence across missed detections
pub mod persistence;

/// Action Unit extraction
pub mod action_units;

/// Smile authenticity analysis
pub mod authenticity;

/// Micro-expression detection and AU trends
pub mod micro_expression;

/// Blink and eye-closure tracking
pub mod blink;

/// Depression-risk heuristics
pub mod risk;

/// Emotion labels and facial emotion estimation
pub mod emotion;

/// Voice features, emotion and indicators
pub mod voice;

/// Facial/voice fusion
pub mod fusion;

/// Per-session pipeline orchestration
pub mod pipeline;

/// Numeric helpers
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the pipeline
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
