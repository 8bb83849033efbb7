//! Numeric helpers shared by the feature extractors and scorers.

use crate::constants::EPSILON;

/// Clamp `value` into `[in_min, in_max]` and rescale linearly onto `[0, out_max]`.
///
/// With `ascending == false` the mapping is reversed, so `in_min` maps to
/// `out_max` and `in_max` maps to zero. Non-finite input maps to zero.
#[must_use]
pub fn remap_clamped(value: f64, in_min: f64, in_max: f64, out_max: f64, ascending: bool) -> f64 {
    if !value.is_finite() || in_max - in_min < EPSILON {
        return 0.0;
    }

    let clamped = value.clamp(in_min, in_max);
    let unit = (clamped - in_min) / (in_max - in_min);
    let unit = if ascending { unit } else { 1.0 - unit };

    (unit * out_max).clamp(0.0, out_max)
}

/// Ratio that returns zero instead of dividing by (near) zero
#[must_use]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// Mean and population standard deviation of a sample
#[must_use]
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
