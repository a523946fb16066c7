//! Cache Adapters
//!
//! Implementations of the AnalysisCache port.
//!
//! ## Available Adapters
//!
//! - **InMemoryAnalysisCache** - Process-local TTL map with optional capacity
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::cache::InMemoryAnalysisCache;
//!
//! let cache = InMemoryAnalysisCache::with_max_entries(1024);
//! ```

mod in_memory;

pub use in_memory::InMemoryAnalysisCache;
