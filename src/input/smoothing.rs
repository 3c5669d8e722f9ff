//! Exponential moving average over raw tracked positions

use serde::{Deserialize, Serialize};

/// Low-pass filter for a noisy position stream.
///
/// Samples may arrive at any rate; reading the value never consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingFilter {
    alpha: f32,
    smoothed: Option<f32>,
}

impl SmoothingFilter {
    /// `alpha` in (0, 1]: higher follows the raw signal more closely
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            smoothed: None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Feed one raw sample and return the new smoothed value.
    /// The first sample after construction or reset is taken as-is.
    pub fn push(&mut self, raw: f32) -> f32 {
        let next = match self.smoothed {
            None => raw,
            Some(prev) => prev * (1.0 - self.alpha) + raw * self.alpha,
        };
        self.smoothed = Some(next);
        next
    }

    /// Last smoothed value, `None` before the first sample
    pub fn value(&self) -> Option<f32> {
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_sample_is_taken_directly() {
        let mut filter = SmoothingFilter::new(0.3);
        assert_eq!(filter.value(), None);
        assert_eq!(filter.push(42.0), 42.0);
        assert_eq!(filter.value(), Some(42.0));
    }

    #[test]
    fn test_weighting() {
        let mut filter = SmoothingFilter::new(0.3);
        filter.push(10.0);
        let v = filter.push(20.0);
        assert!((v - 13.0).abs() < 0.0001);
    }

    #[test]
    fn test_constant_input_converges() {
        let mut filter = SmoothingFilter::new(0.3);
        filter.push(0.0);
        for _ in 0..100 {
            filter.push(10.0);
        }
        assert!((filter.value().unwrap() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_polling_without_samples_is_stable() {
        let mut filter = SmoothingFilter::new(0.3);
        filter.push(5.0);
        filter.push(7.0);
        let v = filter.value();
        for _ in 0..10 {
            assert_eq!(filter.value(), v);
        }
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut filter = SmoothingFilter::new(0.3);
        filter.push(100.0);
        filter.reset();
        assert_eq!(filter.value(), None);
        assert_eq!(filter.push(1.0), 1.0);
    }

    proptest! {
        #[test]
        fn smoothed_stays_within_sample_range(
            samples in proptest::collection::vec(0.0f32..1.0, 1..64),
            alpha in 0.01f32..1.0,
        ) {
            let mut filter = SmoothingFilter::new(alpha);
            let lo = samples.iter().cloned().fold(f32::INFINITY, f32::min);
            let hi = samples.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            for s in &samples {
                let v = filter.push(*s);
                prop_assert!(v >= lo - 1e-4 && v <= hi + 1e-4);
            }
        }
    }
}
