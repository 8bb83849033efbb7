use super::LandmarkFilter;
use crate::landmarks::Landmark;

/// Exponential smoothing filter
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<Vec<Landmark>>,
}

impl ExponentialFilter {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self { alpha, last: None }
    }

    fn blend(&self, value: f64, last: f64) -> f64 {
        if !value.is_finite() {
            last
        } else if !last.is_finite() {
            // Nothing usable to blend with yet
            value
        } else {
            self.alpha * value + (1.0 - self.alpha) * last
        }
    }
}

impl LandmarkFilter for ExponentialFilter {
    fn apply(&mut self, landmarks: &[Landmark]) -> Vec<Landmark> {
        let filtered: Vec<Landmark> = match &self.last {
            Some(last) if last.len() == landmarks.len() => landmarks
                .iter()
                .zip(last)
                .map(|(lm, prev)| {
                    Landmark::new_3d(
                        self.blend(lm.x, prev.x),
                        self.blend(lm.y, prev.y),
                        self.blend(lm.z, prev.z),
                    )
                })
                .collect(),
            _ => landmarks.to_vec(),
        };

        self.last = Some(filtered.clone());
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_filter() {
        let mut filter = ExponentialFilter::new(0.5);

        // First value passes through
        let first = filter.apply(&[Landmark::new(10.0, 20.0)]);
        assert_eq!(first[0], Landmark::new(10.0, 20.0));

        // Second value is smoothed
        let second = filter.apply(&[Landmark::new(20.0, 30.0)]);
        assert_eq!(second[0].x, 15.0); // 0.5 * 20 + 0.5 * 10
        assert_eq!(second[0].y, 25.0);
    }

    #[test]
    fn test_alpha_bounds() {
        // High alpha = less smoothing
        let mut filter1 = ExponentialFilter::new(0.9);
        filter1.apply(&[Landmark::new(10.0, 20.0)]);
        let out = filter1.apply(&[Landmark::new(20.0, 30.0)]);
        assert!((out[0].x - 19.0).abs() < 0.001); // 0.9 * 20 + 0.1 * 10

        // Low alpha = more smoothing
        let mut filter2 = ExponentialFilter::new(0.1);
        filter2.apply(&[Landmark::new(10.0, 20.0)]);
        let out = filter2.apply(&[Landmark::new(20.0, 30.0)]);
        assert!((out[0].x - 11.0).abs() < 0.001); // 0.1 * 20 + 0.9 * 10
    }

    #[test]
    fn test_length_change_passes_through() {
        let mut filter = ExponentialFilter::new(0.5);
        filter.apply(&[Landmark::new(0.0, 0.0)]);
        let input = vec![Landmark::new(8.0, 8.0); 2];
        assert_eq!(filter.apply(&input), input);
    }

    #[test]
    fn test_non_finite_first_frame_recovers() {
        let mut filter = ExponentialFilter::new(0.5);
        filter.apply(&[Landmark::new(f64::NAN, 1.0)]);

        let next = filter.apply(&[Landmark::new(2.0, 1.0)]);
        assert_eq!(next[0], Landmark::new(2.0, 1.0));

        let held = filter.apply(&[Landmark::new(f64::NAN, 1.0)]);
        assert_eq!(held[0].x, 2.0);
    }
}
