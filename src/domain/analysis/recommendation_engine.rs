//! Recommendation Engine - Rule-based advice derived from force readings.
//!
//! Threshold rules fire first; afterwards every core category that no rule
//! covered receives a baseline recommendation built around the strongest
//! relevant force. A research recommendation is appended whenever the
//! analysis itself is too weak to act on.

use serde::{Deserialize, Serialize};

use super::{AnalysisResult, Level, Recommendation, RecommendationCategory};
use crate::domain::forces::{rank_by_strength, Force};

/// Default strength above which a force counts as high.
pub const DEFAULT_HIGH_FORCE_THRESHOLD: f64 = 4.0;

/// Default strength below which a force counts as low.
pub const DEFAULT_LOW_FORCE_THRESHOLD: f64 = 2.0;

/// Default confidence below which results are treated as tentative.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Confidence attached to the insufficient-data research recommendation.
const RESEARCH_CONFIDENCE: f64 = 0.9;

/// Discount applied to baseline recommendations, which no rule backs.
const BASELINE_CONFIDENCE_FACTOR: f64 = 0.8;

/// Tunable thresholds for recommendation rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub high_force: f64,
    pub low_force: f64,
    pub low_confidence: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            high_force: DEFAULT_HIGH_FORCE_THRESHOLD,
            low_force: DEFAULT_LOW_FORCE_THRESHOLD,
            low_confidence: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Weights used to rank recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizationWeights {
    pub impact: f64,
    /// Applied to inverse effort, so cheaper work ranks higher.
    pub effort: f64,
    pub confidence: f64,
    pub priority: f64,
    /// Recommendations below this confidence always rank last.
    pub low_confidence_threshold: f64,
}

impl Default for PrioritizationWeights {
    fn default() -> Self {
        Self {
            impact: 0.35,
            effort: 0.15,
            confidence: 0.3,
            priority: 0.2,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

impl PrioritizationWeights {
    /// Weighted score of one recommendation, in `[0, 1]` for weights summing to 1.
    pub fn score(&self, recommendation: &Recommendation) -> f64 {
        self.impact * recommendation.impact.score()
            + self.effort * (1.0 + Level::Low.score() - recommendation.effort.score())
            + self.confidence * recommendation.confidence
            + self.priority * recommendation.priority.score()
    }
}

/// Generates recommendations from analysis results.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendationThresholds,
    weights: PrioritizationWeights,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendationThresholds, weights: PrioritizationWeights) -> Self {
        Self { thresholds, weights }
    }

    pub fn thresholds(&self) -> &RecommendationThresholds {
        &self.thresholds
    }

    /// Generates prioritized recommendations for a result.
    ///
    /// Always covers messaging, product, marketing and sales.
    pub fn generate(&self, result: &AnalysisResult) -> Vec<Recommendation> {
        let mut recommendations = self.rule_recommendations(result);

        for category in RecommendationCategory::CORE {
            if !recommendations.iter().any(|r| r.category == category) {
                recommendations.push(self.baseline(category, result));
            }
        }

        if let Some(research) = self.research_recommendation(result) {
            recommendations.push(research);
        }

        tracing::debug!(
            survey_id = %result.survey_id,
            count = recommendations.len(),
            "Generated recommendations"
        );

        prioritize_recommendations(recommendations, &self.weights)
    }

    fn rule_recommendations(&self, result: &AnalysisResult) -> Vec<Recommendation> {
        let high = self.thresholds.high_force;
        let low = self.thresholds.low_force;
        let reading = |force: Force| {
            let strength = result.force_distribution.get(force);
            (strength.has_evidence(), strength.strength)
        };
        let is_high = |force: Force| matches!(reading(force), (true, s) if s > high);
        let is_low = |force: Force| matches!(reading(force), (true, s) if s < low);
        let confidence_of = |forces: &[Force]| mean_confidence(result, forces);

        let mut out = Vec::new();

        if is_high(Force::PainOfOld) && is_low(Force::AnchorsToOld) && is_low(Force::AnxietyOfNew) {
            let forces = [Force::PainOfOld, Force::AnchorsToOld, Force::AnxietyOfNew];
            out.push(
                Recommendation::new(
                    RecommendationCategory::Messaging,
                    "Lead with pain points: open every message with the frustrations respondents report",
                    format!(
                        "Pain of the old is {:.2} while anchors ({:.2}) and anxiety ({:.2}) are weak",
                        result.strength_of(Force::PainOfOld),
                        result.strength_of(Force::AnchorsToOld),
                        result.strength_of(Force::AnxietyOfNew)
                    ),
                )
                .with_priority(Level::High)
                .with_impact(Level::High)
                .with_effort(Level::Low)
                .with_confidence(confidence_of(&forces))
                .with_related_forces(forces),
            );
        }

        if is_high(Force::AnchorsToOld) {
            let rationale = format!(
                "Anchors to the old are {:.2}; existing investment holds respondents back",
                result.strength_of(Force::AnchorsToOld)
            );
            let confidence = confidence_of(&[Force::AnchorsToOld]);
            out.push(
                Recommendation::new(
                    RecommendationCategory::Product,
                    "Build migration tooling that imports existing data and workflows",
                    rationale.clone(),
                )
                .with_priority(Level::High)
                .with_impact(Level::High)
                .with_effort(Level::High)
                .with_confidence(confidence)
                .with_related_forces([Force::AnchorsToOld]),
            );
            out.push(
                Recommendation::new(
                    RecommendationCategory::Sales,
                    "Offer a pilot or phased adoption path so teams can switch incrementally",
                    rationale,
                )
                .with_priority(Level::High)
                .with_impact(Level::Medium)
                .with_effort(Level::Medium)
                .with_confidence(confidence)
                .with_related_forces([Force::AnchorsToOld]),
            );
        }

        if is_high(Force::AnxietyOfNew) {
            let rationale = format!(
                "Anxiety of the new is {:.2}; respondents fear the risks of switching",
                result.strength_of(Force::AnxietyOfNew)
            );
            let confidence = confidence_of(&[Force::AnxietyOfNew]);
            out.push(
                Recommendation::new(
                    RecommendationCategory::Sales,
                    "Reverse the risk with free trials, guarantees and assisted onboarding",
                    rationale.clone(),
                )
                .with_priority(Level::High)
                .with_impact(Level::High)
                .with_effort(Level::Low)
                .with_confidence(confidence)
                .with_related_forces([Force::AnxietyOfNew]),
            );
            out.push(
                Recommendation::new(
                    RecommendationCategory::Marketing,
                    "Publish social proof: case studies and testimonials from similar customers",
                    rationale,
                )
                .with_confidence(confidence)
                .with_related_forces([Force::AnxietyOfNew]),
            );
        }

        if is_high(Force::PullOfNew) {
            out.push(
                Recommendation::new(
                    RecommendationCategory::Marketing,
                    "Showcase the outcomes respondents want with concrete before-and-after stories",
                    format!(
                        "Pull of the new is {:.2}; the desired outcomes are a strong attractor",
                        result.strength_of(Force::PullOfNew)
                    ),
                )
                .with_priority(Level::High)
                .with_impact(Level::High)
                .with_effort(Level::Low)
                .with_confidence(confidence_of(&[Force::PullOfNew]))
                .with_related_forces([Force::PullOfNew]),
            );
        }

        out
    }

    fn baseline(&self, category: RecommendationCategory, result: &AnalysisResult) -> Recommendation {
        let (force, content) = match category {
            RecommendationCategory::Messaging => {
                let force = strongest(result, &Force::BY_PRIORITY);
                (force, format!("Frame messaging around {}, the strongest force measured", force.label()))
            }
            RecommendationCategory::Product => {
                let force = strongest(result, &[Force::PullOfNew, Force::AnchorsToOld]);
                let content = match force {
                    Force::AnchorsToOld => "Reduce switching cost with imports and integrations".to_string(),
                    _ => "Prioritize the capabilities that pull respondents toward a new solution".to_string(),
                };
                (force, content)
            }
            RecommendationCategory::Marketing => {
                let force = strongest(result, &[Force::PainOfOld, Force::PullOfNew]);
                (force, format!("Build campaigns that amplify {}", force.label()))
            }
            RecommendationCategory::Sales => {
                let force = result
                    .barriers
                    .first()
                    .copied()
                    .unwrap_or_else(|| strongest(result, &[Force::AnxietyOfNew, Force::AnchorsToOld]));
                (force, format!("Prepare objection handling for {}", force.label()))
            }
            RecommendationCategory::Research => (
                Force::BY_PRIORITY[0],
                "Validate findings with follow-up interviews".to_string(),
            ),
        };

        let priority = if result.force_distribution.get(force).has_evidence() {
            Level::Medium
        } else {
            Level::Low
        };

        Recommendation::new(
            category,
            content,
            format!("{} measured {:.2}", force.label(), result.strength_of(force)),
        )
        .with_priority(priority)
        .with_confidence(mean_confidence(result, &[force]) * BASELINE_CONFIDENCE_FACTOR)
        .with_related_forces([force])
    }

    fn research_recommendation(&self, result: &AnalysisResult) -> Option<Recommendation> {
        let missing = result.forces_without_evidence();
        let low_confidence = result.confidence < self.thresholds.low_confidence;
        if missing.is_empty() && !low_confidence {
            return None;
        }

        let rationale = if missing.is_empty() {
            format!(
                "Overall confidence {:.2} is below {:.2}; the sample size is insufficient",
                result.confidence, self.thresholds.low_confidence
            )
        } else {
            let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            format!(
                "No responses measured {}; the sample size is insufficient",
                names.join(", ")
            )
        };
        let related = if missing.is_empty() {
            Force::BY_PRIORITY.to_vec()
        } else {
            missing
        };

        Some(
            Recommendation::new(
                RecommendationCategory::Research,
                "Collect more responses before acting on these results",
                rationale,
            )
            .with_priority(Level::High)
            .with_confidence(RESEARCH_CONFIDENCE)
            .with_related_forces(related),
        )
    }
}

/// Ranks recommendations by weighted score. Recommendations below the
/// low-confidence threshold always follow confident ones.
pub fn prioritize_recommendations(
    mut recommendations: Vec<Recommendation>,
    weights: &PrioritizationWeights,
) -> Vec<Recommendation> {
    recommendations.sort_by(|a, b| {
        let a_low = a.confidence < weights.low_confidence_threshold;
        let b_low = b.confidence < weights.low_confidence_threshold;
        a_low
            .cmp(&b_low)
            .then_with(|| weights.score(b).total_cmp(&weights.score(a)))
            .then_with(|| a.category.cmp(&b.category))
    });
    recommendations
}

fn strongest(result: &AnalysisResult, candidates: &[Force]) -> Force {
    let mut entries: Vec<(Force, f64)> = candidates
        .iter()
        .map(|f| (*f, result.strength_of(*f)))
        .collect();
    rank_by_strength(&mut entries);
    entries.first().map(|(f, _)| *f).unwrap_or(Force::BY_PRIORITY[0])
}

fn mean_confidence(result: &AnalysisResult, forces: &[Force]) -> f64 {
    if forces.is_empty() {
        return 0.0;
    }
    forces
        .iter()
        .map(|f| result.force_distribution.get(*f).confidence)
        .sum::<f64>()
        / forces.len() as f64
}
