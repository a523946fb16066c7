//! Recommendation value types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::forces::Force;

/// Business area a recommendation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Messaging,
    Product,
    Marketing,
    Sales,
    Research,
}

impl RecommendationCategory {
    /// Categories every analysis covers.
    pub const CORE: [RecommendationCategory; 4] = [
        RecommendationCategory::Messaging,
        RecommendationCategory::Product,
        RecommendationCategory::Marketing,
        RecommendationCategory::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Messaging => "messaging",
            RecommendationCategory::Product => "product",
            RecommendationCategory::Marketing => "marketing",
            RecommendationCategory::Sales => "sales",
            RecommendationCategory::Research => "research",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Three-step scale used for priority, impact and effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Normalized score: 1/3, 2/3 or 1.
    pub fn score(&self) -> f64 {
        match self {
            Level::Low => 1.0 / 3.0,
            Level::Medium => 2.0 / 3.0,
            Level::High => 1.0,
        }
    }
}

/// An actionable suggestion derived from a force analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub content: String,
    pub rationale: String,
    pub priority: Level,
    pub impact: Level,
    pub effort: Level,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Forces whose readings triggered this recommendation.
    pub related_forces: Vec<Force>,
}

impl Recommendation {
    /// Creates a medium priority/impact/effort recommendation.
    pub fn new(
        category: RecommendationCategory,
        content: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            category,
            content: content.into(),
            rationale: rationale.into(),
            priority: Level::Medium,
            impact: Level::Medium,
            effort: Level::Medium,
            confidence: 0.0,
            related_forces: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Level) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_impact(mut self, impact: Level) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_effort(mut self, effort: Level) -> Self {
        self.effort = effort;
        self
    }

    /// Sets the confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        self
    }

    pub fn with_related_forces(mut self, forces: impl IntoIterator<Item = Force>) -> Self {
        self.related_forces = forces.into_iter().collect();
        self
    }
}
