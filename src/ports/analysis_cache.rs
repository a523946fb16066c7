//! Analysis Cache Port - Interface for storing completed analyses.
//!
//! Implementations hold results keyed by an input fingerprint for a bounded
//! time and coalesce concurrent computations for the same key.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::analysis::{AnalysisError, AnalysisResult};

/// Opaque fingerprint identifying one analysis input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A deferred analysis run, executed at most once per key at a time.
/// It must be `'static` because it may outlive the caller that supplied it.
pub type AnalysisComputation = BoxFuture<'static, Result<AnalysisResult, AnalysisError>>;

/// Port for caching analysis results.
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Returns the cached result, or `None` if absent or expired.
    ///
    /// Expired entries are dropped on read, never returned stale.
    async fn get(&self, key: &CacheKey) -> Option<AnalysisResult>;

    /// Stores a result that expires once `ttl` has elapsed.
    async fn put(&self, key: CacheKey, result: AnalysisResult, ttl: Duration);

    /// Removes one entry. Returns true if an entry was present.
    async fn invalidate(&self, key: &CacheKey) -> bool;

    /// Removes every entry.
    async fn clear(&self);

    /// Number of stored entries, including ones not yet swept after expiry.
    async fn len(&self) -> usize;

    /// Returns true if nothing is stored.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the cached result or runs `computation` to produce it.
    ///
    /// Concurrent callers for the same key share a single in-flight
    /// computation and all receive its outcome, success or error. Only
    /// successful results are stored. The computation runs to completion
    /// even if every caller stops waiting for it.
    async fn get_or_compute(
        &self,
        key: CacheKey,
        ttl: Duration,
        computation: AnalysisComputation,
    ) -> Result<AnalysisResult, AnalysisError>;
}
