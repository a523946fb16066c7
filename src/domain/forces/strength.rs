//! Derived force measurements: strengths, distributions and intervals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{is_valid_strength, AggregationMethod, Force, MAX_FORCE_STRENGTH, MIN_FORCE_STRENGTH, NEUTRAL_FORCE_STRENGTH};
use crate::domain::foundation::{SurveyId, Timestamp, ValidationError};

/// Aggregated strength of one force across a respondent population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStrength")]
pub struct ForceStrength {
    pub force: Force,
    /// Strength on the 1-5 scale, two-decimal precision.
    pub strength: f64,
    /// Statistical confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Number of responses that contributed.
    pub sample_size: u32,
    pub standard_deviation: f64,
}

impl ForceStrength {
    /// Creates a force strength, rejecting out-of-range values.
    pub fn new(
        force: Force,
        strength: f64,
        confidence: f64,
        sample_size: u32,
        standard_deviation: f64,
    ) -> Result<Self, ValidationError> {
        if !is_valid_strength(strength) {
            return Err(ValidationError::out_of_range(
                "strength",
                MIN_FORCE_STRENGTH,
                MAX_FORCE_STRENGTH,
                strength,
            ));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::out_of_range("confidence", 0.0, 1.0, confidence));
        }
        if !(standard_deviation >= 0.0 && standard_deviation.is_finite()) {
            return Err(ValidationError::out_of_range(
                "standard_deviation",
                0.0,
                f64::MAX,
                standard_deviation,
            ));
        }

        Ok(Self {
            force,
            strength,
            confidence,
            sample_size,
            standard_deviation,
        })
    }

    /// Placeholder for a force nobody answered a question about.
    ///
    /// Carries the neutral strength with zero confidence so that the
    /// distribution stays complete while signalling the absence of data.
    pub fn no_evidence(force: Force) -> Self {
        Self {
            force,
            strength: NEUTRAL_FORCE_STRENGTH,
            confidence: 0.0,
            sample_size: 0,
            standard_deviation: 0.0,
        }
    }

    /// Returns true if at least one response contributed.
    pub fn has_evidence(&self) -> bool {
        self.sample_size > 0
    }
}

/// Complete set of five force strengths for one survey analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistribution")]
pub struct ForceDistribution {
    pub survey_id: SurveyId,
    strengths: BTreeMap<Force, ForceStrength>,
    pub total_responses: u32,
    pub analysis_date: Timestamp,
    pub methodology: AggregationMethod,
}

impl ForceDistribution {
    /// Builds a distribution, enforcing its invariants.
    ///
    /// # Errors
    /// - A force is missing or appears twice
    /// - The per-force sample sizes sum to less than `total_responses`
    pub fn new(
        survey_id: SurveyId,
        strengths: Vec<ForceStrength>,
        total_responses: u32,
        methodology: AggregationMethod,
        analysis_date: Timestamp,
    ) -> Result<Self, ValidationError> {
        let mut by_force = BTreeMap::new();
        for strength in strengths {
            let force = strength.force;
            if by_force.insert(force, strength).is_some() {
                return Err(ValidationError::invalid_format(
                    "force_distribution",
                    format!("force '{}' appears more than once", force),
                ));
            }
        }

        if let Some(missing) = Force::ALL.iter().find(|f| !by_force.contains_key(f)) {
            return Err(ValidationError::invalid_format(
                "force_distribution",
                format!("force '{}' is missing", missing),
            ));
        }

        let sample_total: u64 = by_force.values().map(|s| u64::from(s.sample_size)).sum();
        if sample_total < u64::from(total_responses) {
            return Err(ValidationError::invalid_format(
                "force_distribution",
                format!(
                    "per-force samples ({}) are fewer than total responses ({})",
                    sample_total, total_responses
                ),
            ));
        }

        Ok(Self {
            survey_id,
            strengths: by_force,
            total_responses,
            analysis_date,
            methodology,
        })
    }

    /// Returns the strength entry for a force.
    pub fn get(&self, force: Force) -> &ForceStrength {
        // Construction guarantees all five forces are present.
        &self.strengths[&force]
    }

    /// Returns the strength value for a force.
    pub fn strength_of(&self, force: Force) -> f64 {
        self.get(force).strength
    }

    /// Iterates entries in force declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ForceStrength> {
        self.strengths.values()
    }

    /// Forces that received no contributing responses.
    pub fn forces_without_evidence(&self) -> Vec<Force> {
        self.iter()
            .filter(|s| !s.has_evidence())
            .map(|s| s.force)
            .collect()
    }
}

/// Unvalidated wire form of a force strength.
#[derive(Deserialize)]
struct RawStrength {
    force: Force,
    strength: f64,
    confidence: f64,
    sample_size: u32,
    standard_deviation: f64,
}

impl TryFrom<RawStrength> for ForceStrength {
    type Error = ValidationError;

    fn try_from(raw: RawStrength) -> Result<Self, Self::Error> {
        ForceStrength::new(
            raw.force,
            raw.strength,
            raw.confidence,
            raw.sample_size,
            raw.standard_deviation,
        )
    }
}

/// Unvalidated wire form of a distribution.
#[derive(Deserialize)]
struct RawDistribution {
    survey_id: SurveyId,
    strengths: BTreeMap<Force, ForceStrength>,
    total_responses: u32,
    analysis_date: Timestamp,
    methodology: AggregationMethod,
}

impl TryFrom<RawDistribution> for ForceDistribution {
    type Error = ValidationError;

    fn try_from(raw: RawDistribution) -> Result<Self, Self::Error> {
        if let Some((key, entry)) = raw.strengths.iter().find(|(key, entry)| **key != entry.force) {
            return Err(ValidationError::invalid_format(
                "force_distribution",
                format!("entry under '{}' describes '{}'", key, entry.force),
            ));
        }
        ForceDistribution::new(
            raw.survey_id,
            raw.strengths.into_values().collect(),
            raw.total_responses,
            raw.methodology,
            raw.analysis_date,
        )
    }
}

/// Statistical interval around a force strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub force: Force,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence_level: f64,
    pub margin_of_error: f64,
}

impl ConfidenceInterval {
    /// Creates an interval, validating its shape.
    pub fn new(
        force: Force,
        lower_bound: f64,
        upper_bound: f64,
        confidence_level: f64,
        margin_of_error: f64,
    ) -> Result<Self, ValidationError> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ValidationError::out_of_range("confidence_level", 0.0, 1.0, confidence_level));
        }
        if !(margin_of_error > 0.0 && margin_of_error.is_finite()) {
            return Err(ValidationError::out_of_range("margin_of_error", 0.0, f64::MAX, margin_of_error));
        }
        if !(lower_bound < upper_bound) {
            return Err(ValidationError::invalid_format(
                "confidence_interval",
                format!("lower bound {} is not below upper bound {}", lower_bound, upper_bound),
            ));
        }

        Ok(Self {
            force,
            lower_bound,
            upper_bound,
            confidence_level,
            margin_of_error,
        })
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Returns true if the value lies strictly inside the interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound < value && value < self.upper_bound
    }
}
