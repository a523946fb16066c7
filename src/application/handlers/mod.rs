//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod analysis;

pub use analysis::{
    analysis_cache_key, RunForcesAnalysisCommand, RunForcesAnalysisHandler, RunForcesAnalysisResult,
    DEFAULT_CACHE_TTL,
};
