//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cache` - Analysis result caches (in-memory)

pub mod cache;

pub use cache::InMemoryAnalysisCache;
