//! Tests for configuration loading and construction-time validation

use affect_pipeline::{
    config::Config,
    filters::{create_filter, exponential::ExponentialFilter, SmootherConfig, SmootherKind},
    landmarks::LandmarkLayout,
    pipeline::AffectPipeline,
    Error,
};

#[test]
fn test_partial_yaml_keeps_defaults() {
    let config = Config::from_yaml(
        "landmarks:\n  point_count: 468\nfusion:\n  facial_weight: 0.8\n",
    )
    .unwrap();
    assert_eq!(config.landmarks.layout().unwrap(), LandmarkLayout::Dense468);
    assert_eq!(config.fusion.facial_weight, 0.8);
    assert_eq!(config.fusion.agreement_cap, 0.95);
    assert_eq!(config.persistence.decay, 0.95);
    assert_eq!(config.smoother.kind, SmootherKind::Kalman);
    assert!(AffectPipeline::new(config).is_ok());
}

#[test]
fn test_file_round_trip() {
    let path = std::env::temp_dir().join(format!("affect-pipeline-config-{}.yaml", std::process::id()));
    let mut config = Config::default();
    config.smoother.kind = SmootherKind::Exponential;
    config.voice.sample_rate = 22_050;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.smoother.kind, SmootherKind::Exponential);
    assert_eq!(loaded.voice.sample_rate, 22_050);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Config::from_file("/nonexistent/affect-pipeline.yaml");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_out_of_range_values_rejected() {
    let cases: [fn(&mut Config); 11] = [
        |c| c.smoother.measurement_noise = 0.0,
        |c| c.smoother.process_noise = -1.0,
        |c| c.persistence.decay = 1.5,
        |c| c.persistence.floor = 1.5,
        |c| c.emotion.activation = f64::NAN,
        |c| c.micro_expression.min_gap_ms = 600.0,
        |c| c.micro_expression.history_depth = 0,
        |c| c.blink.closed_ear = 0.4,
        |c| c.risk.medium_from = 70,
        |c| c.voice.max_pitch_hz = 10_000.0,
        |c| c.fusion.conflict_discount = 2.0,
    ];
    for (i, mutate) in cases.iter().enumerate() {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(config.validate().is_err(), "case {i} should be rejected");
        assert!(AffectPipeline::new(config).is_err(), "case {i}");
    }
}

#[test]
fn test_smoother_kind_parsing() {
    assert_eq!("kalman".parse::<SmootherKind>().unwrap(), SmootherKind::Kalman);
    assert_eq!("EXPONENTIAL".parse::<SmootherKind>().unwrap(), SmootherKind::Exponential);
    assert_eq!("none".parse::<SmootherKind>().unwrap(), SmootherKind::None);
    assert!(matches!("median".parse::<SmootherKind>(), Err(Error::ConfigError(_))));
}

#[test]
fn test_create_filter_rejects_bad_alpha() {
    let config = SmootherConfig {
        kind: SmootherKind::Exponential,
        exponential_alpha: 0.0,
        ..Default::default()
    };
    assert!(create_filter(&config).is_err());
}

#[test]
#[should_panic(expected = "Alpha must be in (0, 1]")]
fn test_exponential_filter_zero_alpha() {
    let _ = ExponentialFilter::new(0.0);
}

#[test]
#[should_panic(expected = "Alpha must be in (0, 1]")]
fn test_exponential_filter_alpha_above_one() {
    let _ = ExponentialFilter::new(1.5);
}
