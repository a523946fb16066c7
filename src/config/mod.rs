//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `JTBD_FORCES` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a working setup.
//!
//! # Example
//!
//! ```no_run
//! use jtbd_forces::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cached analyses live for {:?}", config.cache.ttl());
//! ```

mod cache;
mod error;
mod lexicon;
mod logging;
mod thresholds;

pub use cache::CacheConfig;
pub use error::{ConfigError, ValidationError};
pub use lexicon::LexiconConfig;
pub use logging::LoggingConfig;
pub use thresholds::ThresholdsConfig;

use serde::Deserialize;
use std::sync::Arc;

use crate::adapters::InMemoryAnalysisCache;
use crate::application::RunForcesAnalysisHandler;
use crate::domain::analysis::{
    ForceBalanceAnalyzer, ForcesAnalysisPipeline, QuestionForceClassifier, RecommendationEngine,
    ResponseNormalizer,
};
use crate::domain::forces::AnalysisOptions;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Default options applied to requests that omit them
    #[serde(default)]
    pub analysis: AnalysisOptions,

    /// Result cache sizing and lifetime
    #[serde(default)]
    pub cache: CacheConfig,

    /// Balance and recommendation thresholds
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    /// Optional lexicon file overrides
    #[serde(default)]
    pub lexicon: LexiconConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `JTBD_FORCES` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `JTBD_FORCES__CACHE__TTL_SECS=600` -> `cache.ttl_secs = 600`
    /// - `JTBD_FORCES__THRESHOLDS__BALANCE__BARRIER=2.5` -> `thresholds.balance.barrier = 2.5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("JTBD_FORCES")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.analysis
            .validate()
            .map_err(|e| ValidationError::InvalidAnalysisOptions(e.to_string()))?;
        self.cache.validate()?;
        self.thresholds.validate()?;
        self.lexicon.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Builds a pipeline from the configured lexicons and thresholds
    pub fn build_pipeline(&self) -> Result<ForcesAnalysisPipeline, ConfigError> {
        Ok(ForcesAnalysisPipeline::new(
            QuestionForceClassifier::new(self.lexicon.keyword_dictionary()?),
            ResponseNormalizer::new(self.lexicon.intensity_lexicon()?),
            ForceBalanceAnalyzer::new(self.thresholds.balance),
            RecommendationEngine::new(self.thresholds.recommendation, self.thresholds.prioritization),
        ))
    }

    /// Builds a handler backed by a bounded in-memory cache
    pub fn build_handler(&self) -> Result<RunForcesAnalysisHandler, ConfigError> {
        let cache = InMemoryAnalysisCache::with_max_entries(self.cache.max_entries);
        Ok(RunForcesAnalysisHandler::new(
            Arc::new(cache),
            self.build_pipeline()?,
            self.cache.ttl(),
        ))
    }
}
