//! Forces Analysis Pipeline - Synchronous composition of the analyzers.
//!
//! The pipeline is pure: the same input always yields the same
//! distribution, intervals, balance and recommendations (only the result
//! identifier and timestamps differ between runs).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::{
    AnalysisError, AnalysisResult, ConfidenceIntervalEstimator, ForceBalanceAnalyzer, ForceStrengthCalculator,
    QuestionForceClassifier, RecommendationEngine, ResponseNormalizer,
};
use crate::domain::forces::{
    AnalysisOptions, Force, ForceDistribution, ForceStrength, QuestionForceMapping, Response, SurveyQuestion,
};
use crate::domain::foundation::{SurveyId, Timestamp, ValidationError};

/// Everything needed to analyze one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub survey_id: SurveyId,
    pub responses: Vec<Response>,
    #[serde(default)]
    pub question_mappings: Vec<QuestionForceMapping>,
    /// Question texts, used to classify questions without a mapping.
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

impl AnalysisInput {
    /// Checks the request shape before any analysis work.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.responses.is_empty() {
            return Err(ValidationError::empty_field("responses"));
        }
        if self.question_mappings.is_empty() && self.questions.is_empty() {
            return Err(ValidationError::empty_field("question_mappings"));
        }
        if let Some(foreign) = self
            .question_mappings
            .iter()
            .find(|m| m.survey_id() != &self.survey_id)
        {
            return Err(ValidationError::invalid_format(
                "question_mappings",
                format!(
                    "mapping for question '{}' belongs to survey '{}'",
                    foreign.question_id(),
                    foreign.survey_id()
                ),
            ));
        }
        self.options.validate()
    }
}

/// Runs classification, normalization, aggregation, interval estimation,
/// balance analysis and recommendation generation for one input.
#[derive(Debug, Clone, Default)]
pub struct ForcesAnalysisPipeline {
    classifier: QuestionForceClassifier,
    normalizer: ResponseNormalizer,
    balance: ForceBalanceAnalyzer,
    recommendations: RecommendationEngine,
}

impl ForcesAnalysisPipeline {
    pub fn new(
        classifier: QuestionForceClassifier,
        normalizer: ResponseNormalizer,
        balance: ForceBalanceAnalyzer,
        recommendations: RecommendationEngine,
    ) -> Self {
        Self {
            classifier,
            normalizer,
            balance,
            recommendations,
        }
    }

    /// Analyzes one survey.
    ///
    /// Forces with no contributing responses are reported as no-evidence
    /// strengths; forces with some but too few responses fail the run.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed input
    /// - `InsufficientData` if a force is under-sampled or nothing usable remains
    /// - `Computation` if an aggregate leaves the strength scale
    pub fn run(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
        input.validate()?;
        let options = &input.options;

        tracing::debug!(
            survey_id = %input.survey_id,
            responses = input.responses.len(),
            mappings = input.question_mappings.len(),
            questions = input.questions.len(),
            "Starting forces analysis"
        );

        let mappings = self.resolve_mappings(input)?;
        let normalized = self.normalizer.normalize(&input.responses, &mappings);

        let mut strengths = Vec::with_capacity(Force::ALL.len());
        let mut contributing = BTreeSet::new();
        for force in Force::ALL {
            if !normalized.iter().any(|r| r.force == force) {
                tracing::warn!(
                    survey_id = %input.survey_id,
                    force = %force,
                    "No responses measured force; reporting it without evidence"
                );
                strengths.push(ForceStrength::no_evidence(force));
                continue;
            }
            let detail = ForceStrengthCalculator::calculate_detailed(force, &normalized, options)?;
            contributing.extend(detail.contributing_responses.iter().copied());
            strengths.push(detail.strength);
        }

        if strengths.iter().all(|s| !s.has_evidence()) {
            return Err(AnalysisError::insufficient(
                Force::BY_PRIORITY[0],
                options.minimum_sample_size,
                0,
            ));
        }

        let distribution = ForceDistribution::new(
            input.survey_id.clone(),
            strengths,
            contributing.len() as u32,
            options.aggregation_method,
            Timestamp::now(),
        )?;

        let mut intervals = BTreeMap::new();
        if options.include_confidence_intervals {
            for strength in distribution.iter().filter(|s| s.has_evidence()) {
                let interval = ConfidenceIntervalEstimator::estimate(strength, options.confidence_level)?;
                intervals.insert(strength.force, interval);
            }
        }

        let balance = self.balance.analyze(&distribution);
        let mut result = AnalysisResult::new(distribution, intervals, balance);

        if options.include_recommendations {
            let recommendations = self.recommendations.generate(&result);
            result = result.with_recommendations(recommendations);
        }

        tracing::info!(
            survey_id = %result.survey_id,
            analysis_id = %result.id,
            total_responses = result.force_distribution.total_responses,
            switch_likelihood = result.switch_likelihood,
            confidence = result.confidence,
            "Completed forces analysis"
        );

        Ok(result)
    }

    /// Explicit mappings plus classified mappings for unmapped questions.
    fn resolve_mappings(&self, input: &AnalysisInput) -> Result<Vec<QuestionForceMapping>, ValidationError> {
        let mapped: HashSet<_> = input.question_mappings.iter().map(|m| m.question_id()).collect();
        let mut mappings = input.question_mappings.clone();

        let mut classified = HashSet::new();
        for question in &input.questions {
            if mapped.contains(&question.question_id) || !classified.insert(&question.question_id) {
                continue;
            }
            mappings.push(self.classifier.classify_question(
                &question.text,
                question.question_id.clone(),
                input.survey_id.clone(),
            )?);
        }

        Ok(mappings)
    }
}
