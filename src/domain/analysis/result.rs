//! The analysis result handed back to callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ForceBalance, Recommendation};
use crate::domain::forces::{ConfidenceInterval, Force, ForceDistribution};
use crate::domain::foundation::{AnalysisId, SurveyId, Timestamp};

/// Outcome of one forces analysis. Never mutated in place; use the
/// consuming builders to derive a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: AnalysisId,
    pub survey_id: SurveyId,
    pub force_distribution: ForceDistribution,
    pub confidence_intervals: BTreeMap<Force, ConfidenceInterval>,
    pub switch_likelihood: f64,
    pub primary_drivers: Vec<Force>,
    pub secondary_drivers: Vec<Force>,
    pub barriers: Vec<Force>,
    /// Overall confidence (0.0 - 1.0)
    pub confidence: f64,
    pub recommendations: Vec<Recommendation>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AnalysisResult {
    /// Assembles a result from a distribution and its balance.
    pub fn new(
        force_distribution: ForceDistribution,
        confidence_intervals: BTreeMap<Force, ConfidenceInterval>,
        balance: ForceBalance,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: AnalysisId::new(),
            survey_id: force_distribution.survey_id.clone(),
            force_distribution,
            confidence_intervals,
            switch_likelihood: balance.switch_likelihood,
            primary_drivers: balance.primary_drivers,
            secondary_drivers: balance.secondary_drivers,
            barriers: balance.barriers,
            confidence: balance.confidence,
            recommendations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy carrying the given recommendations.
    pub fn with_recommendations(mut self, recommendations: Vec<Recommendation>) -> Self {
        self.recommendations = recommendations;
        self.updated_at = Timestamp::now();
        self
    }

    pub fn strength_of(&self, force: Force) -> f64 {
        self.force_distribution.strength_of(force)
    }

    pub fn interval_for(&self, force: Force) -> Option<&ConfidenceInterval> {
        self.confidence_intervals.get(&force)
    }

    /// Forces that received no contributing responses.
    pub fn forces_without_evidence(&self) -> Vec<Force> {
        self.force_distribution.forces_without_evidence()
    }
}
