//! Per-request analysis options.

use serde::{Deserialize, Serialize};

use super::AggregationMethod;
use crate::domain::foundation::ValidationError;

/// Options controlling a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub include_confidence_intervals: bool,
    pub include_recommendations: bool,
    /// Minimum contributing responses for a force with any evidence.
    pub minimum_sample_size: u32,
    pub confidence_level: f64,
    pub aggregation_method: AggregationMethod,
    pub exclude_outliers: bool,
    pub cache_results: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_confidence_intervals: true,
            include_recommendations: true,
            minimum_sample_size: 30,
            confidence_level: 0.95,
            aggregation_method: AggregationMethod::WeightedAverage,
            exclude_outliers: true,
            cache_results: true,
        }
    }
}

impl AnalysisOptions {
    /// Validates option ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ValidationError::out_of_range(
                "confidence_level",
                0.0,
                1.0,
                self.confidence_level,
            ));
        }
        if self.minimum_sample_size == 0 {
            return Err(ValidationError::out_of_range(
                "minimum_sample_size",
                1.0,
                f64::from(u32::MAX),
                0.0,
            ));
        }
        Ok(())
    }

    /// Sets the minimum sample size.
    pub fn with_minimum_sample_size(mut self, size: u32) -> Self {
        self.minimum_sample_size = size;
        self
    }

    /// Sets the aggregation method.
    pub fn with_method(mut self, method: AggregationMethod) -> Self {
        self.aggregation_method = method;
        self
    }

    /// Disables result caching.
    pub fn without_cache(mut self) -> Self {
        self.cache_results = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = AnalysisOptions::default();
        assert_eq!(options.minimum_sample_size, 30);
        assert_eq!(options.confidence_level, 0.95);
        assert_eq!(options.aggregation_method, AggregationMethod::WeightedAverage);
        assert!(options.exclude_outliers);
        assert!(options.cache_results);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"aggregation_method":"median","minimum_sample_size":5}"#).unwrap();
        assert_eq!(options.aggregation_method, AggregationMethod::Median);
        assert_eq!(options.minimum_sample_size, 5);
        assert_eq!(options.confidence_level, 0.95);
    }

    #[test]
    fn validate_rejects_bad_confidence_level() {
        let options = AnalysisOptions {
            confidence_level: 1.0,
            ..Default::default()
        };
        assert_eq!(options.validate().unwrap_err().field(), "confidence_level");
    }

    #[test]
    fn validate_rejects_zero_minimum_sample() {
        let options = AnalysisOptions::default().with_minimum_sample_size(0);
        assert!(options.validate().is_err());
    }
}
