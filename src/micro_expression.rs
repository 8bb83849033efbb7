//! Micro-expression detection over per-AU history.
//!
//! Every frame's AU vector is pushed into a bounded ring per AU; `observe`
//! then compares the two most recent samples against the time since the
//! previous observation and flags fast, short-lived changes.

use crate::{
    action_units::{AuId, AuMap, AuVector},
    Error, Result,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Timing window and rate threshold of the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroExpressionConfig {
    /// Samples kept per AU
    pub history_depth: usize,
    /// Shortest gap that is judged; anything faster is noise
    pub min_gap_ms: f64,
    /// Longest gap that is judged; anything slower is not a micro-expression
    pub max_gap_ms: f64,
    /// Intensity units per second
    pub rate_threshold: f64,
}

impl Default for MicroExpressionConfig {
    fn default() -> Self {
        Self {
            history_depth: crate::constants::DEFAULT_HISTORY_DEPTH,
            min_gap_ms: crate::constants::DEFAULT_MICRO_MIN_GAP_MS,
            max_gap_ms: crate::constants::DEFAULT_MICRO_MAX_GAP_MS,
            rate_threshold: crate::constants::DEFAULT_MICRO_RATE_THRESHOLD,
        }
    }
}

impl MicroExpressionConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for a depth below 2, negative timing or
    /// threshold values, or an inverted timing window.
    pub fn validate(&self) -> Result<()> {
        if self.history_depth < 2 {
            return Err(Error::ConfigError(format!(
                "micro_expression.history_depth must be at least 2, got {}",
                self.history_depth
            )));
        }
        for (name, value) in [
            ("min_gap_ms", self.min_gap_ms),
            ("max_gap_ms", self.max_gap_ms),
            ("rate_threshold", self.rate_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "micro_expression.{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.min_gap_ms > self.max_gap_ms {
            return Err(Error::ConfigError(format!(
                "micro_expression.min_gap_ms ({}) exceeds max_gap_ms ({})",
                self.min_gap_ms, self.max_gap_ms
            )));
        }
        Ok(())
    }
}

/// A flagged rapid AU change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicroExpressionEvent {
    pub au: AuId,
    /// Absolute change rate in intensity units per second
    pub rate: f64,
    pub gap_ms: f64,
    /// Intensity before and after the change
    pub from: f64,
    pub to: f64,
}

/// Statistical summary of a data window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Range (max - min) of the data
    pub range: f64,
}

impl Statistics {
    /// Statistics of a non-empty window
    #[must_use]
    pub fn of(data: &VecDeque<f64>) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;

        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let std_dev = variance.sqrt();

        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        Some(Self {
            mean,
            std_dev,
            min,
            max,
            range,
        })
    }
}

/// Bounded ring of recent intensities for every AU
#[derive(Debug, Clone)]
pub struct AuHistory {
    depth: usize,
    rings: AuMap<VecDeque<f64>>,
    last_observed_ms: Option<f64>,
}

impl AuHistory {
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            rings: AuMap::from_fn(|_| VecDeque::with_capacity(depth)),
            last_observed_ms: None,
        }
    }

    /// Append one frame's intensities, dropping the oldest beyond depth
    pub fn push(&mut self, aus: &AuVector) {
        for id in AuId::ALL {
            let ring = self.rings.get_mut(id);
            if ring.len() >= self.depth {
                ring.pop_front();
            }
            ring.push_back(aus.get(id));
        }
    }

    #[must_use]
    pub fn series(&self, id: AuId) -> &VecDeque<f64> {
        self.rings.get_ref(id)
    }

    /// Number of frames currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.rings.au1.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn last_observed_ms(&self) -> Option<f64> {
        self.last_observed_ms
    }

    /// Clear every ring and the observation timestamp
    pub fn clear(&mut self) {
        for id in AuId::ALL {
            self.rings.get_mut(id).clear();
        }
        self.last_observed_ms = None;
    }
}

/// Flags sub-second high-rate AU changes
#[derive(Debug, Clone)]
pub struct MicroExpressionDetector {
    config: MicroExpressionConfig,
    history: AuHistory,
}

impl MicroExpressionDetector {
    /// Create a new detector
    #[must_use]
    pub fn new(config: MicroExpressionConfig) -> Self {
        let history = AuHistory::new(config.history_depth);
        Self { config, history }
    }

    /// Record the AU vector for the current frame
    pub fn push(&mut self, aus: &AuVector) {
        self.history.push(aus);
    }

    /// Judge the latest pushed frame against the previous one.
    ///
    /// The first observation only stores its timestamp. Afterwards, a gap
    /// outside `[min_gap_ms, max_gap_ms]` makes no judgment; inside it, the
    /// first AU in [`AuId::ALL`] order whose change rate exceeds the
    /// threshold is reported.
    pub fn observe(&mut self, timestamp_ms: f64) -> Option<MicroExpressionEvent> {
        let previous = self.history.last_observed_ms.replace(timestamp_ms)?;
        let gap_ms = timestamp_ms - previous;
        if !gap_ms.is_finite()
            || gap_ms <= 0.0
            || gap_ms < self.config.min_gap_ms
            || gap_ms > self.config.max_gap_ms
        {
            return None;
        }

        if self.history.len() < 2 {
            return None;
        }

        let gap_s = gap_ms / 1000.0;
        for id in AuId::ALL {
            let ring = self.history.series(id);
            let to = ring[ring.len() - 1];
            let from = ring[ring.len() - 2];
            let rate = (to - from).abs() / gap_s;
            if rate > self.config.rate_threshold {
                debug!("Micro-expression on {id}: {from:.2} -> {to:.2} in {gap_ms:.0} ms");
                return Some(MicroExpressionEvent { au: id, rate, gap_ms, from, to });
            }
        }
        None
    }

    /// Window statistics of one AU, once at least one sample is held
    #[must_use]
    pub fn trend(&self, id: AuId) -> Option<Statistics> {
        Statistics::of(self.history.series(id))
    }

    /// Window statistics of every AU
    #[must_use]
    pub fn trends(&self) -> Option<AuMap<Statistics>> {
        if self.history.is_empty() {
            return None;
        }
        Some(AuMap::from_fn(|id| self.trend(id).unwrap_or_default()))
    }

    #[must_use]
    pub fn history(&self) -> &AuHistory {
        &self.history
    }

    /// Reset the detector
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_au12(value: f64) -> AuVector {
        let mut aus = AuVector::default();
        aus.set(AuId::Au12, value);
        aus
    }

    #[test]
    fn test_flags_fast_change() {
        let mut detector = MicroExpressionDetector::new(MicroExpressionConfig::default());
        detector.push(&with_au12(0.0));
        assert!(detector.observe(0.0).is_none());

        detector.push(&with_au12(3.0));
        let event = detector.observe(100.0).unwrap();
        assert_eq!(event.au, AuId::Au12);
        assert!((event.rate - 30.0).abs() < 1e-9);
        assert_eq!(event.gap_ms, 100.0);
    }

    #[test]
    fn test_single_sample_is_not_judged() {
        let mut detector = MicroExpressionDetector::new(MicroExpressionConfig::default());
        assert!(detector.observe(0.0).is_none());
        detector.push(&with_au12(5.0));
        assert!(detector.observe(100.0).is_none());

        // The skipped judgment still advances the observation clock
        detector.push(&with_au12(0.0));
        let event = detector.observe(200.0).unwrap();
        assert_eq!(event.gap_ms, 100.0);
    }

    #[test]
    fn test_ignores_gaps_outside_window() {
        let mut detector = MicroExpressionDetector::new(MicroExpressionConfig::default());
        detector.push(&with_au12(0.0));
        detector.observe(0.0);

        detector.push(&with_au12(5.0));
        assert!(detector.observe(20.0).is_none(), "too fast is noise");

        detector.push(&with_au12(0.0));
        assert!(detector.observe(620.0).is_none(), "too slow is not micro");
    }

    #[test]
    fn test_slow_change_is_not_flagged() {
        let mut detector = MicroExpressionDetector::new(MicroExpressionConfig::default());
        detector.push(&with_au12(1.0));
        detector.observe(0.0);
        detector.push(&with_au12(1.5));
        // 0.5 over 100 ms is 5 units/s
        assert!(detector.observe(100.0).is_none());
    }

    #[test]
    fn test_reports_first_au_in_order() {
        let mut detector = MicroExpressionDetector::new(MicroExpressionConfig::default());
        detector.push(&AuVector::default());
        detector.observe(0.0);

        let mut aus = AuVector::default();
        aus.set(AuId::Au4, 4.0);
        aus.set(AuId::Au15, 5.0);
        detector.push(&aus);
        assert_eq!(detector.observe(100.0).unwrap().au, AuId::Au4);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = MicroExpressionConfig { history_depth: 5, ..Default::default() };
        let mut detector = MicroExpressionDetector::new(config);
        for i in 0..12 {
            detector.push(&with_au12(f64::from(i)));
        }
        assert_eq!(detector.history().len(), 5);
        assert_eq!(detector.history().series(AuId::Au12).front(), Some(&7.0));
    }

    #[test]
    fn test_statistics_calculation() {
        let data = VecDeque::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let stats = Statistics::of(&data).unwrap();
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.range, 4.0);
        assert!((stats.std_dev - 1.414_213_562_373_095_1).abs() < 1e-10);
        assert!(Statistics::of(&VecDeque::new()).is_none());
    }

    #[test]
    fn test_trends_and_reset() {
        let mut detector = MicroExpressionDetector::new(MicroExpressionConfig::default());
        assert!(detector.trends().is_none());
        for value in [1.0, 2.0, 3.0] {
            detector.push(&with_au12(value));
        }
        let trends = detector.trends().unwrap();
        assert_eq!(trends.au12.mean, 2.0);
        assert_eq!(trends.au1.range, 0.0);

        detector.observe(0.0);
        detector.reset();
        assert!(detector.history().is_empty());
        assert!(detector.history().last_observed_ms().is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(MicroExpressionConfig::default().validate().is_ok());
        let inverted = MicroExpressionConfig { min_gap_ms: 600.0, ..Default::default() };
        assert!(inverted.validate().is_err());
        let negative = MicroExpressionConfig { rate_threshold: -1.0, ..Default::default() };
        assert!(negative.validate().is_err());
        let shallow = MicroExpressionConfig { history_depth: 1, ..Default::default() };
        assert!(shallow.validate().is_err());
    }
}
