//! Configuration error types

use thiserror::Error;

use crate::domain::forces::LexiconError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Lexicon loading failed: {0}")]
    Lexicon(#[from] LexiconError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid analysis options: {0}")]
    InvalidAnalysisOptions(String),

    #[error("Cache TTL must be between 1 and 86400 seconds")]
    InvalidCacheTtl,

    #[error("Cache max_entries must be greater than zero")]
    InvalidCacheCapacity,

    #[error("Threshold {0} must lie on the 1-5 strength scale")]
    ThresholdOutOfRange(&'static str),

    #[error("Threshold {0} must be a fraction between 0 and 1")]
    FractionOutOfRange(&'static str),

    #[error("Low force threshold must be below the high force threshold")]
    InvertedForceThresholds,

    #[error("Prioritization weights must be non-negative and sum to a positive value")]
    InvalidPrioritizationWeights,

    #[error("Lexicon file not found: {0}")]
    LexiconFileMissing(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
