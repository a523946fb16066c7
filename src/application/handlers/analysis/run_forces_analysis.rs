//! RunForcesAnalysisHandler - Command handler for running a forces analysis.
//!
//! Validates the command, derives the cache key and runs the pipeline on a
//! blocking worker through the cache, so that identical concurrent requests
//! share one computation.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::cache_key::analysis_cache_key;
use crate::domain::analysis::{AnalysisError, AnalysisInput, AnalysisResult, ForcesAnalysisPipeline};
use crate::ports::{AnalysisCache, CacheKey};

/// Default lifetime of a cached analysis.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Command to analyze one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunForcesAnalysisCommand {
    pub input: AnalysisInput,
}

impl RunForcesAnalysisCommand {
    pub fn new(input: AnalysisInput) -> Self {
        Self { input }
    }
}

/// Result of a successful analysis run.
#[derive(Debug, Clone)]
pub struct RunForcesAnalysisResult {
    pub result: AnalysisResult,
    /// Key the result is cached under, if caching was requested.
    pub cache_key: Option<CacheKey>,
    /// True if the result was served from a stored entry.
    pub from_cache: bool,
}

/// Handler for running forces analyses.
pub struct RunForcesAnalysisHandler {
    cache: Arc<dyn AnalysisCache>,
    pipeline: Arc<ForcesAnalysisPipeline>,
    cache_ttl: Duration,
}

impl RunForcesAnalysisHandler {
    pub fn new(cache: Arc<dyn AnalysisCache>, pipeline: ForcesAnalysisPipeline, cache_ttl: Duration) -> Self {
        Self {
            cache,
            pipeline: Arc::new(pipeline),
            cache_ttl,
        }
    }

    pub async fn handle(&self, cmd: RunForcesAnalysisCommand) -> Result<RunForcesAnalysisResult, AnalysisError> {
        let input = cmd.input;

        // 1. Reject malformed input before touching the cache
        input.validate()?;

        // 2. Uncached requests run directly
        if !input.options.cache_results {
            let result = run_blocking(Arc::clone(&self.pipeline), input).await?;
            return Ok(RunForcesAnalysisResult {
                result,
                cache_key: None,
                from_cache: false,
            });
        }

        // 3. Serve a stored result when one is fresh
        let key = analysis_cache_key(&input)?;
        if let Some(result) = self.cache.get(&key).await {
            info!(
                survey_id = %input.survey_id,
                analysis_id = %result.id,
                "Serving cached forces analysis"
            );
            return Ok(RunForcesAnalysisResult {
                result,
                cache_key: Some(key),
                from_cache: true,
            });
        }

        // 4. Compute, coalescing with identical in-flight requests
        let computation = run_blocking(Arc::clone(&self.pipeline), input).boxed();
        let result = self
            .cache
            .get_or_compute(key.clone(), self.cache_ttl, computation)
            .await?;

        Ok(RunForcesAnalysisResult {
            result,
            cache_key: Some(key),
            from_cache: false,
        })
    }

    /// Drops the cached result for an input. Returns true if one was stored.
    pub async fn invalidate(&self, input: &AnalysisInput) -> Result<bool, AnalysisError> {
        let key = analysis_cache_key(input)?;
        Ok(self.cache.invalidate(&key).await)
    }
}

/// Runs the CPU-bound pipeline on the blocking pool.
async fn run_blocking(
    pipeline: Arc<ForcesAnalysisPipeline>,
    input: AnalysisInput,
) -> Result<AnalysisResult, AnalysisError> {
    tokio::task::spawn_blocking(move || pipeline.run(&input))
        .await
        .map_err(|e| AnalysisError::Internal(e.to_string()))?
}
