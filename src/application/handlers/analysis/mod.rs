//! Forces analysis handlers.
//!
//! Handlers that validate analysis requests and run them through the cache.

mod cache_key;
mod run_forces_analysis;

pub use cache_key::analysis_cache_key;
pub use run_forces_analysis::{
    RunForcesAnalysisCommand, RunForcesAnalysisHandler, RunForcesAnalysisResult, DEFAULT_CACHE_TTL,
};
