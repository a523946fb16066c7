//! Confidence Interval Estimator - t-style intervals around force strengths.

use super::stats::t_critical;
use super::AnalysisError;
use crate::domain::forces::{ConfidenceInterval, ForceStrength};
use crate::domain::foundation::ValidationError;

/// Standard deviation used when every response agreed.
pub const MIN_STANDARD_DEVIATION: f64 = 0.1;

/// Sample size below which intervals are widened.
pub const SMALL_SAMPLE_THRESHOLD: u32 = 30;

/// Widening applied at a sample size of zero, tapering to none at the threshold.
const SMALL_SAMPLE_INFLATION: f64 = 0.25;

/// Estimator for confidence intervals.
pub struct ConfidenceIntervalEstimator;

impl ConfidenceIntervalEstimator {
    /// Estimates the interval around `strength` at `confidence_level`.
    ///
    /// `margin = t(level, n - 1) × max(sd, 0.1) / √n`, widened for samples
    /// under 30. Bounds are not clipped to the strength scale.
    ///
    /// # Errors
    ///
    /// - `Validation` if the level is outside `(0, 1)`
    /// - `InsufficientData` if the strength has no contributing responses
    pub fn estimate(
        strength: &ForceStrength,
        confidence_level: f64,
    ) -> Result<ConfidenceInterval, AnalysisError> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ValidationError::out_of_range("confidence_level", 0.0, 1.0, confidence_level).into());
        }
        let n = strength.sample_size;
        if n == 0 {
            return Err(AnalysisError::insufficient(strength.force, 1, 0));
        }

        let margin = Self::margin_of_error(strength.standard_deviation, n, confidence_level);
        let interval = ConfidenceInterval::new(
            strength.force,
            strength.strength - margin,
            strength.strength + margin,
            confidence_level,
            margin,
        )?;

        tracing::debug!(
            force = %strength.force,
            confidence_level,
            margin,
            "Estimated confidence interval"
        );

        Ok(interval)
    }

    /// Margin of error for a sample of `n` with the given deviation.
    pub fn margin_of_error(standard_deviation: f64, n: u32, confidence_level: f64) -> f64 {
        let n = n.max(1);
        let t = t_critical(confidence_level, n.saturating_sub(1));
        let sd = standard_deviation.max(MIN_STANDARD_DEVIATION);
        let inflation = if n < SMALL_SAMPLE_THRESHOLD {
            1.0 + SMALL_SAMPLE_INFLATION * f64::from(SMALL_SAMPLE_THRESHOLD - n) / f64::from(SMALL_SAMPLE_THRESHOLD)
        } else {
            1.0
        };
        t * sd / f64::from(n).sqrt() * inflation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forces::Force;
    use proptest::prelude::*;

    fn strength(value: f64, n: u32, sd: f64) -> ForceStrength {
        ForceStrength::new(Force::PainOfOld, value, 0.8, n, sd).unwrap()
    }

    #[test]
    fn interval_brackets_the_strength() {
        let s = strength(4.0, 50, 0.8);
        let ci = ConfidenceIntervalEstimator::estimate(&s, 0.95).unwrap();
        assert!(ci.lower_bound < 4.0 && 4.0 < ci.upper_bound);
        assert!((ci.upper_bound - ci.lower_bound - 2.0 * ci.margin_of_error).abs() < 1e-9);
        assert_eq!(ci.confidence_level, 0.95);
    }

    #[test]
    fn large_sample_margin_matches_t_formula() {
        let ci = ConfidenceIntervalEstimator::estimate(&strength(3.0, 100, 1.0), 0.95).unwrap();
        // t(0.975, 99) ≈ 1.984
        assert!((ci.margin_of_error - 0.1984).abs() < 0.002);
    }

    #[test]
    fn identical_responses_still_get_a_positive_margin() {
        let ci = ConfidenceIntervalEstimator::estimate(&strength(5.0, 10, 0.0), 0.95).unwrap();
        assert!(ci.margin_of_error > 0.0);
        // Bounds are not clipped to the scale.
        assert!(ci.upper_bound > 5.0);
    }

    #[test]
    fn single_response_interval_is_defined() {
        let ci = ConfidenceIntervalEstimator::estimate(&strength(2.0, 1, 0.0), 0.9).unwrap();
        assert!(ci.contains(2.0));
    }

    #[test]
    fn invalid_levels_are_rejected() {
        let s = strength(3.0, 10, 0.5);
        for level in [0.0, 1.0, -0.5, 1.5] {
            let err = ConfidenceIntervalEstimator::estimate(&s, level).unwrap_err();
            assert!(matches!(err, AnalysisError::Validation(_)));
        }
    }

    #[test]
    fn no_evidence_is_insufficient_data() {
        let err = ConfidenceIntervalEstimator::estimate(&ForceStrength::no_evidence(Force::AnxietyOfNew), 0.95)
            .unwrap_err();
        assert_eq!(err, AnalysisError::insufficient(Force::AnxietyOfNew, 1, 0));
    }

    #[test]
    fn small_samples_are_widened() {
        let plain = t_critical(0.95, 9) * 0.5 / 10f64.sqrt();
        let margin = ConfidenceIntervalEstimator::margin_of_error(0.5, 10, 0.95);
        assert!(margin > plain);
    }

    proptest! {
        #[test]
        fn higher_level_strictly_widens(
            n in 1u32..500,
            sd in 0.0f64..2.0,
            low in 0.5f64..0.9,
            delta in 0.01f64..0.09,
        ) {
            let narrow = ConfidenceIntervalEstimator::margin_of_error(sd, n, low);
            let wide = ConfidenceIntervalEstimator::margin_of_error(sd, n, low + delta);
            prop_assert!(wide > narrow);
        }

        #[test]
        fn larger_sample_strictly_narrows(
            n in 1u32..500,
            extra in 1u32..500,
            sd in 0.0f64..2.0,
            level in 0.5f64..0.99,
        ) {
            let small = ConfidenceIntervalEstimator::margin_of_error(sd, n, level);
            let large = ConfidenceIntervalEstimator::margin_of_error(sd, n + extra, level);
            prop_assert!(large < small);
        }
    }
}
