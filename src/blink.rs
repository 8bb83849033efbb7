//! Blink and eye-closure tracking.
//!
//! Each fresh frame contributes one mean eye aspect ratio (EAR). A drop
//! below `closed_ear` opens a closure; the next sample back above it ends
//! the closure, which counts as a blink when its length is inside
//! `[min_blink_ms, max_blink_ms]` and as a prolonged closure when longer.

use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Thresholds and windows of the blink tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// EAR below which the eyes count as closed
    pub closed_ear: f64,
    /// EAR below which a sample counts towards the closure ratio
    pub low_ear: f64,
    /// Shortest closure counted as a blink
    pub min_blink_ms: f64,
    /// Longest closure counted as a blink; longer ones are prolonged
    pub max_blink_ms: f64,
    /// Window the blink rate is measured over
    pub rate_window_ms: f64,
    /// EAR samples kept for the closure ratio
    pub history_depth: usize,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            closed_ear: crate::constants::DEFAULT_BLINK_CLOSED_EAR,
            low_ear: crate::constants::DEFAULT_BLINK_LOW_EAR,
            min_blink_ms: crate::constants::DEFAULT_BLINK_MIN_MS,
            max_blink_ms: crate::constants::DEFAULT_BLINK_MAX_MS,
            rate_window_ms: crate::constants::DEFAULT_BLINK_RATE_WINDOW_MS,
            history_depth: crate::constants::DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl BlinkConfig {
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for non-positive thresholds or windows,
    /// a closed threshold above the low threshold, an inverted blink duration
    /// range, or an empty history.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("closed_ear", self.closed_ear),
            ("low_ear", self.low_ear),
            ("max_blink_ms", self.max_blink_ms),
            ("rate_window_ms", self.rate_window_ms),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "blink.{name} must be positive, got {value}"
                )));
            }
        }
        if self.closed_ear > self.low_ear {
            return Err(Error::ConfigError(format!(
                "blink.closed_ear ({}) exceeds low_ear ({})",
                self.closed_ear, self.low_ear
            )));
        }
        if !self.min_blink_ms.is_finite() || self.min_blink_ms < 0.0 || self.min_blink_ms > self.max_blink_ms {
            return Err(Error::ConfigError(format!(
                "blink.min_blink_ms must be in [0, {}], got {}",
                self.max_blink_ms, self.min_blink_ms
            )));
        }
        if self.history_depth == 0 {
            return Err(Error::ConfigError("blink.history_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Blink state after one EAR sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkReport {
    /// Mean eye aspect ratio of this frame
    pub ear: f64,
    pub eyes_closed: bool,
    /// A blink ended on this frame
    pub blink: bool,
    /// A closure longer than a blink ended on this frame
    pub prolonged_closure: bool,
    /// Blinks inside the rate window
    pub blink_count: usize,
    /// Blinks per minute, 0 until one second of samples is held
    pub blink_rate_per_min: f64,
    /// Share of recent samples below `low_ear`
    pub closure_ratio: f64,
}

/// Bounded blink and closure state for one session
pub struct BlinkTracker {
    config: BlinkConfig,
    closed_since_ms: Option<f64>,
    first_sample_ms: Option<f64>,
    blinks: VecDeque<f64>,
    ears: VecDeque<f64>,
}

impl BlinkTracker {
    #[must_use]
    pub fn new(config: BlinkConfig) -> Self {
        let ears = VecDeque::with_capacity(config.history_depth);
        Self {
            config,
            closed_since_ms: None,
            first_sample_ms: None,
            blinks: VecDeque::new(),
            ears,
        }
    }

    /// Feed the mean EAR of a fresh frame. A non-finite EAR leaves the state
    /// untouched.
    pub fn update(&mut self, timestamp_ms: f64, ear: f64) -> BlinkReport {
        let mut blink = false;
        let mut prolonged_closure = false;

        if ear.is_finite() && timestamp_ms.is_finite() {
            self.first_sample_ms.get_or_insert(timestamp_ms);

            if self.ears.len() == self.config.history_depth {
                self.ears.pop_front();
            }
            self.ears.push_back(ear);

            if ear < self.config.closed_ear {
                self.closed_since_ms.get_or_insert(timestamp_ms);
            } else if let Some(start) = self.closed_since_ms.take() {
                let duration = timestamp_ms - start;
                if duration > self.config.max_blink_ms {
                    debug!("Prolonged eye closure of {duration:.0} ms");
                    prolonged_closure = true;
                } else if duration >= self.config.min_blink_ms {
                    debug!("Blink of {duration:.0} ms at {timestamp_ms} ms");
                    self.blinks.push_back(timestamp_ms);
                    blink = true;
                }
            }

            let cutoff = timestamp_ms - self.config.rate_window_ms;
            while self.blinks.front().is_some_and(|&t| t < cutoff) {
                self.blinks.pop_front();
            }
        }

        BlinkReport {
            ear,
            eyes_closed: self.closed_since_ms.is_some(),
            blink,
            prolonged_closure,
            blink_count: self.blinks.len(),
            blink_rate_per_min: self.rate_per_min(timestamp_ms),
            closure_ratio: self.closure_ratio(),
        }
    }

    fn rate_per_min(&self, timestamp_ms: f64) -> f64 {
        let Some(first) = self.first_sample_ms else {
            return 0.0;
        };
        let span_ms = (timestamp_ms - first).min(self.config.rate_window_ms);
        if !span_ms.is_finite() || span_ms < 1000.0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.blinks.len() as f64;
        count / (span_ms / 60_000.0)
    }

    fn closure_ratio(&self) -> f64 {
        if self.ears.is_empty() {
            return 0.0;
        }
        let low = self.ears.iter().filter(|&&e| e < self.config.low_ear).count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = low as f64 / self.ears.len() as f64;
        ratio
    }

    /// Forget every closure, blink and sample
    pub fn reset(&mut self) {
        self.closed_since_ms = None;
        self.first_sample_ms = None;
        self.blinks.clear();
        self.ears.clear();
    }

    #[must_use]
    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }
}
