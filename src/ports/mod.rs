//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Cache Ports
//!
//! - `AnalysisCache` - TTL store for completed analyses with per-key
//!   computation coalescing

mod analysis_cache;

pub use analysis_cache::{AnalysisCache, AnalysisComputation, CacheKey};
