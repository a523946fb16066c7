//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    analysis_cache_key, RunForcesAnalysisCommand, RunForcesAnalysisHandler, RunForcesAnalysisResult,
    DEFAULT_CACHE_TTL,
};
