//! Force Strength Calculator - Aggregates normalized intensities per force.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::stats::{mean, median_sorted, quantile_sorted, round_to, sample_std_dev};
use super::{AnalysisError, NormalizedResponse};
use crate::domain::forces::{
    is_valid_strength, AggregationMethod, AnalysisOptions, Force, ForceStrength, MappingSource,
    NEUTRAL_FORCE_STRENGTH,
};

/// Share of responses dropped from each end by the trimmed mean.
pub const TRIM_FRACTION: f64 = 0.1;

/// Tukey fence multiplier for outlier exclusion.
pub const OUTLIER_IQR_MULTIPLIER: f64 = 1.5;

/// Responses needed before outlier exclusion is attempted.
pub const MIN_VALUES_FOR_OUTLIERS: usize = 4;

/// Sample size at which the sample factor reaches ~63%.
const SAMPLE_SATURATION: f64 = 30.0;

/// Blend between mapping confidence and sample factor.
const MAPPING_CONFIDENCE_SHARE: f64 = 0.6;

/// Relative weight of classified mappings in the confidence blend.
const CLASSIFIED_MAPPING_WEIGHT: f64 = 0.5;

/// A force strength together with the responses that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceStrengthDetail {
    pub strength: ForceStrength,
    /// Indices of the raw responses that contributed after outlier removal.
    pub contributing_responses: Vec<usize>,
    pub excluded_outliers: usize,
}

/// Calculator for per-force strengths.
pub struct ForceStrengthCalculator;

impl ForceStrengthCalculator {
    /// Aggregates the intensities mapped to `force`.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` with zero contributors or fewer than
    ///   `options.minimum_sample_size`
    /// - `Computation` if the aggregate leaves the 1-5 scale
    pub fn calculate(
        force: Force,
        responses: &[NormalizedResponse],
        options: &AnalysisOptions,
    ) -> Result<ForceStrength, AnalysisError> {
        Self::calculate_detailed(force, responses, options).map(|detail| detail.strength)
    }

    /// Same as [`calculate`](Self::calculate), also reporting contributors
    /// and excluded outliers.
    pub fn calculate_detailed(
        force: Force,
        responses: &[NormalizedResponse],
        options: &AnalysisOptions,
    ) -> Result<ForceStrengthDetail, AnalysisError> {
        let method = options.aggregation_method;
        let relevant: Vec<&NormalizedResponse> = responses.iter().filter(|r| r.force == force).collect();

        let count = relevant.len() as u32;
        if count == 0 || count < options.minimum_sample_size {
            return Err(AnalysisError::insufficient(force, options.minimum_sample_size, count));
        }

        let (kept, excluded_outliers) = if options.exclude_outliers {
            exclude_outliers(relevant)
        } else {
            (relevant, 0)
        };

        let raw = round_to(aggregate(method, &kept), 2);
        if !raw.is_finite() || !is_valid_strength(raw) {
            tracing::error!(
                force = %force,
                method = %method,
                value = raw,
                "Aggregated strength outside the 1-5 scale"
            );
            return Err(AnalysisError::computation(
                force,
                method,
                format!("aggregate {} is outside [1, 5]", raw),
            ));
        }

        let intensities: Vec<f64> = kept.iter().map(|r| r.intensity).collect();
        let standard_deviation = round_to(sample_std_dev(&intensities), 4);
        let confidence = blended_confidence(&kept);

        let strength = ForceStrength::new(
            force,
            raw,
            confidence,
            kept.len() as u32,
            standard_deviation,
        )
        .map_err(|e| AnalysisError::computation(force, method, e.to_string()))?;

        tracing::debug!(
            force = %force,
            method = %method,
            strength = strength.strength,
            sample_size = strength.sample_size,
            excluded_outliers,
            "Calculated force strength"
        );

        Ok(ForceStrengthDetail {
            strength,
            contributing_responses: kept.iter().map(|r| r.response_index).collect(),
            excluded_outliers,
        })
    }
}

/// Drops intensities outside the Tukey fences.
fn exclude_outliers(values: Vec<&NormalizedResponse>) -> (Vec<&NormalizedResponse>, usize) {
    if values.len() < MIN_VALUES_FOR_OUTLIERS {
        return (values, 0);
    }

    let mut sorted: Vec<f64> = values.iter().map(|r| r.intensity).collect();
    sorted.sort_by(f64::total_cmp);
    let (Some(q1), Some(q3)) = (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75)) else {
        return (values, 0);
    };
    let iqr = q3 - q1;
    let low = q1 - OUTLIER_IQR_MULTIPLIER * iqr;
    let high = q3 + OUTLIER_IQR_MULTIPLIER * iqr;

    let before = values.len();
    let kept: Vec<&NormalizedResponse> = values
        .into_iter()
        .filter(|r| r.intensity >= low && r.intensity <= high)
        .collect();
    let excluded = before - kept.len();
    (kept, excluded)
}

fn aggregate(method: AggregationMethod, values: &[&NormalizedResponse]) -> f64 {
    let intensities: Vec<f64> = values.iter().map(|r| r.intensity).collect();
    match method {
        AggregationMethod::WeightedAverage => weighted_average(values),
        AggregationMethod::Median => {
            let mut sorted = intensities;
            sorted.sort_by(f64::total_cmp);
            median_sorted(&sorted).unwrap_or(f64::NAN)
        }
        AggregationMethod::Mode => mode(&intensities),
        AggregationMethod::TrimmedMean => trimmed_mean(intensities),
    }
}

/// Σ intensity·weight·confidence / Σ weight·confidence, falling back to a
/// weight-only average when every mapping has zero confidence.
fn weighted_average(values: &[&NormalizedResponse]) -> f64 {
    let denominator: f64 = values.iter().map(|r| r.weight * r.mapping_confidence).sum();
    if denominator > f64::EPSILON {
        let numerator: f64 = values
            .iter()
            .map(|r| r.intensity * r.weight * r.mapping_confidence)
            .sum();
        return numerator / denominator;
    }

    let weights: f64 = values.iter().map(|r| r.weight).sum();
    if weights > f64::EPSILON {
        values.iter().map(|r| r.intensity * r.weight).sum::<f64>() / weights
    } else {
        f64::NAN
    }
}

/// Most frequent rounded intensity. Ties go to the value nearest neutral,
/// then to the lower value.
fn mode(intensities: &[f64]) -> f64 {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for value in intensities {
        *counts.entry(value.round() as i64).or_default() += 1;
    }

    let neutral = NEUTRAL_FORCE_STRENGTH as i64;
    counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| {
            ca.cmp(cb)
                .then_with(|| (vb - neutral).abs().cmp(&(va - neutral).abs()))
                .then_with(|| vb.cmp(va))
        })
        .map(|(value, _)| value as f64)
        .unwrap_or(f64::NAN)
}

fn trimmed_mean(mut intensities: Vec<f64>) -> f64 {
    intensities.sort_by(f64::total_cmp);
    let trim = (intensities.len() as f64 * TRIM_FRACTION).floor() as usize;
    let slice = &intensities[trim..intensities.len() - trim];
    mean(slice).unwrap_or(f64::NAN)
}

/// 0.6 × mean mapping confidence + 0.4 × sample factor.
fn blended_confidence(values: &[&NormalizedResponse]) -> f64 {
    let (weighted, total) = values.iter().fold((0.0, 0.0), |(weighted, total), r| {
        let share = match r.source {
            MappingSource::Explicit => 1.0,
            MappingSource::Classified => CLASSIFIED_MAPPING_WEIGHT,
        };
        (weighted + r.mapping_confidence * share, total + share)
    });
    let mapping_confidence = if total > 0.0 { weighted / total } else { 0.0 };
    let sample_factor = 1.0 - (-(values.len() as f64) / SAMPLE_SATURATION).exp();

    (MAPPING_CONFIDENCE_SHARE * mapping_confidence + (1.0 - MAPPING_CONFIDENCE_SHARE) * sample_factor)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{QuestionId, SessionId};
    use proptest::prelude::*;

    fn entry(index: usize, force: Force, intensity: f64, weight: f64, confidence: f64) -> NormalizedResponse {
        NormalizedResponse {
            response_index: index,
            question_id: QuestionId::new("q1").unwrap(),
            session_id: SessionId::new(format!("r{}", index)).unwrap(),
            force,
            intensity,
            weight,
            mapping_confidence: confidence,
            source: MappingSource::Explicit,
            matched_keywords: Vec::new(),
        }
    }

    fn entries(force: Force, intensities: &[f64]) -> Vec<NormalizedResponse> {
        intensities
            .iter()
            .enumerate()
            .map(|(i, v)| entry(i, force, *v, 1.0, 0.9))
            .collect()
    }

    fn options(method: AggregationMethod) -> AnalysisOptions {
        AnalysisOptions {
            minimum_sample_size: 1,
            exclude_outliers: false,
            ..AnalysisOptions::default()
        }
        .with_method(method)
    }

    fn calc(method: AggregationMethod, intensities: &[f64]) -> ForceStrength {
        ForceStrengthCalculator::calculate(Force::PainOfOld, &entries(Force::PainOfOld, intensities), &options(method))
            .unwrap()
    }

    #[test]
    fn weighted_average_uses_weight_and_confidence() {
        let data = vec![
            entry(0, Force::PullOfNew, 5.0, 2.0, 1.0),
            entry(1, Force::PullOfNew, 1.0, 1.0, 0.5),
        ];
        let result = ForceStrengthCalculator::calculate(
            Force::PullOfNew,
            &data,
            &options(AggregationMethod::WeightedAverage),
        )
        .unwrap();
        // (5·2 + 1·0.5) / 2.5 = 4.2
        assert_eq!(result.strength, 4.2);
        assert_eq!(result.sample_size, 2);
    }

    #[test]
    fn weighted_average_falls_back_when_confidence_is_zero() {
        let data = vec![
            entry(0, Force::PainOfOld, 4.0, 1.0, 0.0),
            entry(1, Force::PainOfOld, 2.0, 1.0, 0.0),
        ];
        let result =
            ForceStrengthCalculator::calculate(Force::PainOfOld, &data, &options(AggregationMethod::WeightedAverage))
                .unwrap();
        assert_eq!(result.strength, 3.0);
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(calc(AggregationMethod::Median, &[1.0, 5.0, 4.0]).strength, 4.0);
        assert_eq!(calc(AggregationMethod::Median, &[1.0, 2.0, 4.0, 5.0]).strength, 3.0);
    }

    #[test]
    fn mode_rounds_and_breaks_ties_toward_neutral() {
        assert_eq!(calc(AggregationMethod::Mode, &[4.2, 3.9, 1.0]).strength, 4.0);
        assert_eq!(calc(AggregationMethod::Mode, &[5.0, 5.0, 2.0, 2.0]).strength, 2.0);
        assert_eq!(calc(AggregationMethod::Mode, &[2.0, 4.0]).strength, 2.0);
    }

    #[test]
    fn trimmed_mean_drops_extremes() {
        let values = [1.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 5.0];
        assert_eq!(calc(AggregationMethod::TrimmedMean, &values).strength, 3.0);
        // Fewer than ten values trims nothing.
        assert_eq!(calc(AggregationMethod::TrimmedMean, &[1.0, 2.0, 3.0]).strength, 2.0);
    }

    #[test]
    fn strength_is_rounded_to_two_decimals() {
        assert_eq!(calc(AggregationMethod::Median, &[1.0, 4.345]).strength, 2.67);
    }

    #[test]
    fn zero_contributors_is_insufficient_data() {
        let err = ForceStrengthCalculator::calculate(
            Force::AnxietyOfNew,
            &entries(Force::PainOfOld, &[4.0, 4.0]),
            &options(AggregationMethod::Median),
        )
        .unwrap_err();
        assert_eq!(err, AnalysisError::insufficient(Force::AnxietyOfNew, 1, 0));
    }

    #[test]
    fn below_minimum_sample_is_insufficient_data() {
        let opts = AnalysisOptions::default().with_minimum_sample_size(100);
        let err = ForceStrengthCalculator::calculate(Force::PainOfOld, &entries(Force::PainOfOld, &[4.0; 5]), &opts)
            .unwrap_err();
        assert_eq!(err, AnalysisError::insufficient(Force::PainOfOld, 100, 5));
    }

    #[test]
    fn outliers_are_excluded_when_enabled() {
        let values = [4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 1.0];
        let opts = AnalysisOptions {
            exclude_outliers: true,
            ..options(AggregationMethod::WeightedAverage)
        };
        let detail =
            ForceStrengthCalculator::calculate_detailed(Force::PainOfOld, &entries(Force::PainOfOld, &values), &opts)
                .unwrap();
        assert_eq!(detail.excluded_outliers, 1);
        assert_eq!(detail.strength.strength, 4.0);
        assert_eq!(detail.strength.sample_size, 6);
        assert!(!detail.contributing_responses.contains(&6));
    }

    #[test]
    fn outlier_exclusion_needs_four_values() {
        let opts = AnalysisOptions {
            exclude_outliers: true,
            ..options(AggregationMethod::WeightedAverage)
        };
        let detail = ForceStrengthCalculator::calculate_detailed(
            Force::PainOfOld,
            &entries(Force::PainOfOld, &[4.0, 4.0, 1.0]),
            &opts,
        )
        .unwrap();
        assert_eq!(detail.excluded_outliers, 0);
    }

    #[test]
    fn classified_mappings_count_half_toward_confidence() {
        let explicit = entries(Force::PainOfOld, &[4.0, 4.0]);
        let mut mixed = explicit.clone();
        mixed[1].source = MappingSource::Classified;
        mixed[1].mapping_confidence = 0.1;

        let opts = options(AggregationMethod::Median);
        let a = ForceStrengthCalculator::calculate(Force::PainOfOld, &explicit, &opts).unwrap();
        let b = ForceStrengthCalculator::calculate(Force::PainOfOld, &mixed, &opts).unwrap();
        assert!(b.confidence < a.confidence);
        // (0.9 + 0.1·0.5) / 1.5 = 0.6333 mapping confidence
        let sample = 1.0 - (-2.0f64 / 30.0).exp();
        assert!((b.confidence - (0.6 * (0.95 / 1.5) + 0.4 * sample)).abs() < 1e-9);
    }

    #[test]
    fn confidence_grows_with_sample_size() {
        let small = calc(AggregationMethod::WeightedAverage, &[4.0; 5]);
        let large = calc(AggregationMethod::WeightedAverage, &[4.0; 100]);
        assert!(large.confidence > small.confidence);
    }

    #[test]
    fn standard_deviation_is_sample_based() {
        assert_eq!(calc(AggregationMethod::Median, &[3.0]).standard_deviation, 0.0);
        let s = calc(AggregationMethod::Median, &[2.0, 4.0]);
        assert!((s.standard_deviation - 1.4142).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn strength_and_confidence_stay_in_range(
            values in prop::collection::vec((1.0f64..=5.0, 0.01f64..=2.0, 0.0f64..=1.0), 1..60),
            method_index in 0usize..4,
            exclude in any::<bool>(),
        ) {
            let data: Vec<NormalizedResponse> = values
                .iter()
                .enumerate()
                .map(|(i, (v, w, c))| entry(i, Force::PullOfNew, *v, *w, *c))
                .collect();
            let opts = AnalysisOptions {
                exclude_outliers: exclude,
                ..options(AggregationMethod::ALL[method_index])
            };
            let result = ForceStrengthCalculator::calculate(Force::PullOfNew, &data, &opts).unwrap();
            prop_assert!((1.0..=5.0).contains(&result.strength));
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert!(result.standard_deviation >= 0.0);
        }
    }
}
