//! Analysis Module - Pure domain services for forces analysis.
//!
//! This module contains stateless analyzers that turn survey responses into
//! a force distribution, a force balance and recommendations.
//!
//! # Components
//!
//! - `QuestionForceClassifier` - Keyword heuristics for unmapped questions
//! - `ResponseNormalizer` - Non-answer filtering and 1-5 intensity extraction
//! - `ForceStrengthCalculator` - Per-force aggregation (weighted average, median, mode, trimmed mean)
//! - `ConfidenceIntervalEstimator` - t-style intervals with small-sample inflation
//! - `ForceBalanceAnalyzer` - Push/pull/barrier grouping and switch likelihood
//! - `RecommendationEngine` - Rule-based recommendations and prioritization
//! - `ForcesAnalysisPipeline` - Composition of all of the above for one request
//!
//! # Design Philosophy
//!
//! All functions are pure (no side effects) and synchronous. Caching and
//! request coalescing live behind the `AnalysisCache` port.

mod balance_analyzer;
mod classifier;
mod confidence_interval;
mod errors;
mod normalizer;
mod pipeline;
mod recommendation;
mod recommendation_engine;
mod result;
mod stats;
mod strength_calculator;

pub use balance_analyzer::{
    BalanceThresholds, ForceBalance, ForceBalanceAnalyzer, DEFAULT_BARRIER_THRESHOLD,
    DEFAULT_PRIMARY_DRIVER_THRESHOLD,
};
pub use classifier::{KeywordHits, QuestionForceClassifier, MAX_CLASSIFIER_CONFIDENCE};
pub use confidence_interval::{ConfidenceIntervalEstimator, MIN_STANDARD_DEVIATION, SMALL_SAMPLE_THRESHOLD};
pub use errors::AnalysisError;
pub use normalizer::{IntensityScore, NormalizedResponse, ResponseNormalizer};
pub use pipeline::{AnalysisInput, ForcesAnalysisPipeline};
pub use recommendation::{Level, Recommendation, RecommendationCategory};
pub use recommendation_engine::{
    prioritize_recommendations, PrioritizationWeights, RecommendationEngine, RecommendationThresholds,
    DEFAULT_HIGH_FORCE_THRESHOLD, DEFAULT_LOW_CONFIDENCE_THRESHOLD, DEFAULT_LOW_FORCE_THRESHOLD,
};
pub use result::AnalysisResult;
pub use strength_calculator::{
    ForceStrengthCalculator, ForceStrengthDetail, MIN_VALUES_FOR_OUTLIERS, OUTLIER_IQR_MULTIPLIER, TRIM_FRACTION,
};
