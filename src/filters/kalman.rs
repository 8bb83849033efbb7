use super::LandmarkFilter;
use crate::landmarks::Landmark;
use log::warn;
use nalgebra::Vector3;

/// Bank of constant-position Kalman filters, one scalar filter per axis of
/// every landmark
pub struct KalmanSmoother {
    // Per-point [x, y, z] estimates
    estimates: Vec<Vector3<f64>>,
    // Per-point [x, y, z] estimate variances
    variances: Vec<Vector3<f64>>,
    // Variance growth per step
    process_noise: f64,
    // Measurement variance
    measurement_noise: f64,
    // Per-point [x, y, z] flags, set by the first finite measurement of an axis
    seeded: Vec<[bool; 3]>,
}

impl KalmanSmoother {
    #[must_use]
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            estimates: Vec::new(),
            variances: Vec::new(),
            process_noise,
            measurement_noise,
            seeded: Vec::new(),
        }
    }

    /// Number of points the filter bank is sized for
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.estimates.len()
    }

    fn reinitialize(&mut self, point_count: usize) {
        self.estimates = vec![Vector3::zeros(); point_count];
        self.variances = vec![Vector3::repeat(1.0); point_count];
        self.seeded = vec![[false; 3]; point_count];
    }

    fn step(&mut self, index: usize, measurement: Vector3<f64>) -> Vector3<f64> {
        let mut output = measurement;

        for axis in 0..3 {
            let z = measurement[axis];

            // An axis passes through raw until a finite value seeds it
            if !self.seeded[index][axis] {
                if z.is_finite() {
                    self.estimates[index][axis] = z;
                    self.seeded[index][axis] = true;
                }
                continue;
            }

            // Predict: the position is assumed constant, only uncertainty grows
            let predicted = self.variances[index][axis] + self.process_noise;

            if !z.is_finite() {
                self.variances[index][axis] = predicted;
                output[axis] = self.estimates[index][axis];
                continue;
            }

            let r = self.measurement_noise;
            let gain = if predicted + r > 0.0 { predicted / (predicted + r) } else { 1.0 };

            self.estimates[index][axis] += gain * (z - self.estimates[index][axis]);
            self.variances[index][axis] = predicted * (1.0 - gain);
            output[axis] = self.estimates[index][axis];
        }

        output
    }
}

impl Default for KalmanSmoother {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_PROCESS_NOISE,
            crate::constants::DEFAULT_MEASUREMENT_NOISE,
        )
    }
}

impl LandmarkFilter for KalmanSmoother {
    fn apply(&mut self, landmarks: &[Landmark]) -> Vec<Landmark> {
        if landmarks.len() != self.estimates.len() {
            if !self.estimates.is_empty() {
                warn!(
                    "Landmark count changed from {} to {}, re-initialising smoother",
                    self.estimates.len(),
                    landmarks.len()
                );
            }
            self.reinitialize(landmarks.len());
        }

        landmarks
            .iter()
            .enumerate()
            .map(|(i, lm)| {
                let s = self.step(i, Vector3::new(lm.x, lm.y, lm.z));
                Landmark::new_3d(s.x, s.y, s.z)
            })
            .collect()
    }

    fn reset(&mut self) {
        for estimate in &mut self.estimates {
            *estimate = Vector3::zeros();
        }
        for variance in &mut self.variances {
            *variance = Vector3::repeat(1.0);
        }
        for flags in &mut self.seeded {
            *flags = [false; 3];
        }
    }

    fn name(&self) -> &str {
        "KalmanSmoother"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f64, y: f64) -> Vec<Landmark> {
        vec![Landmark::new(x, y), Landmark::new(x + 1.0, y + 1.0)]
    }

    #[test]
    fn test_kalman_filter() {
        let mut filter = KalmanSmoother::default();

        // First measurement initializes the filter
        let first = filter.apply(&frame(10.0, 20.0));
        assert_eq!(first, frame(10.0, 20.0));

        // Subsequent measurements should be smoothed
        let second = filter.apply(&frame(11.0, 21.0));
        assert!(second[0].x > 10.0 && second[0].x < 11.0);
        assert!(second[0].y > 20.0 && second[0].y < 21.0);
    }

    #[test]
    fn test_first_update_gain() {
        let mut filter = KalmanSmoother::new(0.01, 0.1);
        filter.apply(&frame(0.0, 0.0));
        let out = filter.apply(&frame(1.0, 0.0));
        // variance 1.01, gain 1.01 / 1.11
        assert!((out[0].x - 1.01 / 1.11).abs() < 1e-12);
        assert_eq!(out[0].y, 0.0);
    }

    #[test]
    fn test_converges_monotonically_on_static_signal() {
        let mut filter = KalmanSmoother::default();
        filter.apply(&frame(0.0, 0.0));

        let mut last_error = f64::INFINITY;
        for _ in 0..50 {
            let out = filter.apply(&frame(5.0, -3.0));
            let error = (out[0].x - 5.0).abs() + (out[0].y + 3.0).abs();
            assert!(error <= last_error);
            last_error = error;
        }
        assert!(last_error < 1e-3);
    }

    #[test]
    fn test_point_count_change_reinitializes() {
        let mut filter = KalmanSmoother::default();
        filter.apply(&frame(0.0, 0.0));
        filter.apply(&frame(1.0, 1.0));

        let three = vec![Landmark::new(4.0, 4.0); 3];
        assert_eq!(filter.apply(&three), three);
        assert_eq!(filter.point_count(), 3);
    }

    #[test]
    fn test_reset_matches_fresh_filter() {
        let mut used = KalmanSmoother::default();
        for i in 0..10 {
            used.apply(&frame(f64::from(i), 0.0));
        }
        used.reset();

        let mut fresh = KalmanSmoother::default();
        for input in [frame(3.0, 3.0), frame(4.0, 2.0), frame(5.0, 1.0)] {
            assert_eq!(used.apply(&input), fresh.apply(&input));
        }
    }

    #[test]
    fn test_non_finite_measurement_holds_estimate() {
        let mut filter = KalmanSmoother::default();
        filter.apply(&frame(1.0, 1.0));
        let out = filter.apply(&[Landmark::new(f64::NAN, 0.0), Landmark::new(2.0, 2.0)]);
        // Only the bad axis is held, the other one keeps tracking
        assert_eq!(out[0].x, 1.0);
        assert!(out[0].y > 0.0 && out[0].y < 1.0);
        let out = filter.apply(&frame(1.0, 1.0));
        assert!(out[0].x.is_finite());
    }

    #[test]
    fn test_non_finite_first_frame_seeds_from_next_finite_value() {
        let mut filter = KalmanSmoother::default();
        let first = filter.apply(&[Landmark::new(f64::NAN, 1.0)]);
        assert!(first[0].x.is_nan());
        assert_eq!(first[0].y, 1.0);

        let mut out = Vec::new();
        for _ in 0..50 {
            out = filter.apply(&[Landmark::new(2.0, 1.0)]);
        }
        assert_eq!(out[0].x, 2.0);
        assert!((out[0].y - 1.0).abs() < 1e-12);
    }
}
