//! In-Memory Analysis Cache Adapter
//!
//! Stores analysis results in a process-local map with per-entry expiry.
//! One mutex guards both the entry map and the in-flight map; it is held
//! only for map access and released before awaiting a computation.
//!
//! Computations run as detached tasks. Callers await a shared handle, so a
//! caller that gives up neither cancels nor restarts the work.

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::analysis::{AnalysisError, AnalysisResult};
use crate::ports::{AnalysisCache, AnalysisComputation, CacheKey};

type Outcome = Result<AnalysisResult, AnalysisError>;
type InFlight = Shared<BoxFuture<'static, Outcome>>;

#[derive(Debug)]
struct CacheEntry {
    result: AnalysisResult,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    in_flight: HashMap<CacheKey, InFlight>,
}

impl CacheState {
    /// Returns a live entry, dropping it if it has expired.
    fn fresh(&mut self, key: &CacheKey, now: Instant) -> Option<AnalysisResult> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.result.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert(&mut self, key: CacheKey, result: AnalysisResult, ttl: Duration, max_entries: Option<usize>) {
        let now = Instant::now();
        if let Some(max) = max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= max {
                self.entries.retain(|_, entry| !entry.is_expired(now));
            }
            while !self.entries.contains_key(&key) && self.entries.len() >= max.max(1) {
                let Some(victim) = self
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                tracing::debug!(key = %victim, "Evicting analysis closest to expiry");
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                result,
                expires_at: now + ttl,
            },
        );
    }
}

/// In-memory TTL cache for analysis results.
#[derive(Clone, Default)]
pub struct InMemoryAnalysisCache {
    state: Arc<Mutex<CacheState>>,
    max_entries: Option<usize>,
}

impl InMemoryAnalysisCache {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache holding at most `max_entries` results.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            state: Arc::default(),
            max_entries: Some(max_entries),
        }
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Number of computations currently in flight.
    pub async fn in_flight(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Spawns `computation` and returns a handle every waiter can await.
    ///
    /// The task itself settles the slot: it removes the in-flight entry and
    /// stores a successful result under the same lock, whether or not anyone
    /// is still waiting. Must be called with the state lock held so the task
    /// cannot settle before its slot is registered.
    fn spawn_computation(&self, key: CacheKey, ttl: Duration, computation: AnalysisComputation) -> InFlight {
        let state = Arc::clone(&self.state);
        let max_entries = self.max_entries;

        let task = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(computation).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(AnalysisError::Internal("analysis computation panicked".to_string())),
            };

            let mut state = state.lock().await;
            state.in_flight.remove(&key);
            if let Ok(result) = &outcome {
                state.insert(key.clone(), result.clone(), ttl, max_entries);
            }
            tracing::debug!(key = %key, success = outcome.is_ok(), "Analysis computation settled");
            outcome
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(AnalysisError::Internal(format!("analysis task failed: {}", e))))
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl AnalysisCache for InMemoryAnalysisCache {
    async fn get(&self, key: &CacheKey) -> Option<AnalysisResult> {
        let mut state = self.state.lock().await;
        state.fresh(key, Instant::now())
    }

    async fn put(&self, key: CacheKey, result: AnalysisResult, ttl: Duration) {
        let mut state = self.state.lock().await;
        state.insert(key, result, ttl, self.max_entries);
    }

    async fn invalidate(&self, key: &CacheKey) -> bool {
        let mut state = self.state.lock().await;
        state.entries.remove(key).is_some()
    }

    async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    async fn get_or_compute(
        &self,
        key: CacheKey,
        ttl: Duration,
        computation: AnalysisComputation,
    ) -> Result<AnalysisResult, AnalysisError> {
        let pending = {
            let mut state = self.state.lock().await;
            if let Some(hit) = state.fresh(&key, Instant::now()) {
                tracing::debug!(key = %key, "Analysis cache hit");
                return Ok(hit);
            }
            if let Some(pending) = state.in_flight.get(&key).cloned() {
                tracing::debug!(key = %key, "Joining in-flight analysis");
                pending
            } else {
                let pending = self.spawn_computation(key.clone(), ttl, computation);
                state.in_flight.insert(key, pending.clone());
                pending
            }
        };

        pending.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::ForceBalanceAnalyzer;
    use crate::domain::forces::{AggregationMethod, Force, ForceDistribution, ForceStrength};
    use crate::domain::foundation::{SurveyId, Timestamp};
    use futures::FutureExt;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_result(survey: &str) -> AnalysisResult {
        let mut strengths: Vec<ForceStrength> = Force::ALL.iter().map(|f| ForceStrength::no_evidence(*f)).collect();
        strengths[1] = ForceStrength::new(Force::PainOfOld, 4.0, 0.8, 10, 0.5).unwrap();
        let distribution = ForceDistribution::new(
            SurveyId::new(survey).unwrap(),
            strengths,
            10,
            AggregationMethod::WeightedAverage,
            Timestamp::now(),
        )
        .unwrap();
        let balance = ForceBalanceAnalyzer::default().analyze(&distribution);
        AnalysisResult::new(distribution, BTreeMap::new(), balance)
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name)
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn put_then_get_returns_result() {
        let cache = InMemoryAnalysisCache::new();
        let result = sample_result("s1");
        cache.put(key("k1"), result.clone(), TTL).await;

        assert_eq!(cache.get(&key("k1")).await, Some(result));
        assert_eq!(cache.get(&key("k2")).await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryAnalysisCache::new();
        cache.put(key("k1"), sample_result("s1"), TTL).await;

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert!(cache.get(&key("k1")).await.is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get(&key("k1")).await.is_none());
        // Expired entries are dropped on read.
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn invalidate_removes_one_entry() {
        let cache = InMemoryAnalysisCache::new();
        cache.put(key("k1"), sample_result("s1"), TTL).await;
        cache.put(key("k2"), sample_result("s2"), TTL).await;

        assert!(cache.invalidate(&key("k1")).await);
        assert!(!cache.invalidate(&key("k1")).await);
        assert!(cache.get(&key("k1")).await.is_none());
        assert!(cache.get(&key("k2")).await.is_some());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = InMemoryAnalysisCache::new();
        cache.put(key("k1"), sample_result("s1"), TTL).await;
        cache.put(key("k2"), sample_result("s2"), TTL).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_evicts_entry_closest_to_expiry() {
        let cache = InMemoryAnalysisCache::with_max_entries(2);
        cache.put(key("short"), sample_result("s1"), Duration::from_secs(10)).await;
        cache.put(key("long"), sample_result("s2"), Duration::from_secs(100)).await;
        cache.put(key("new"), sample_result("s3"), Duration::from_secs(50)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&key("short")).await.is_none());
        assert!(cache.get(&key("long")).await.is_some());
        assert!(cache.get(&key("new")).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_requests_compute_once() {
        let cache = Arc::new(InMemoryAnalysisCache::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                let computation = async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(sample_result("s1"))
                }
                .boxed();
                cache.get_or_compute(key("k1"), TTL, computation).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.in_flight().await, 0);
        assert!(cache.get(&key("k1")).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn followers_share_errors_and_failures_are_not_cached() {
        let cache = Arc::new(InMemoryAnalysisCache::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                let computation = async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Err(AnalysisError::insufficient(Force::PainOfOld, 30, 5))
                }
                .boxed();
                cache.get_or_compute(key("k1"), TTL, computation).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap_err().is_insufficient_data());
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty().await);
        assert_eq!(cache.in_flight().await, 0);
    }

    #[tokio::test]
    async fn distinct_keys_compute_independently() {
        let cache = InMemoryAnalysisCache::new();
        let a = cache
            .get_or_compute(key("a"), TTL, async { Ok(sample_result("s1")) }.boxed())
            .await
            .unwrap();
        let b = cache
            .get_or_compute(key("b"), TTL, async { Ok(sample_result("s2")) }.boxed())
            .await
            .unwrap();

        assert_ne!(a.survey_id, b.survey_id);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn cached_result_short_circuits_computation() {
        let cache = InMemoryAnalysisCache::new();
        let stored = sample_result("s1");
        cache.put(key("k1"), stored.clone(), TTL).await;

        let result = cache
            .get_or_compute(
                key("k1"),
                TTL,
                async { Err(AnalysisError::Internal("should not run".into())) }.boxed(),
            )
            .await
            .unwrap();
        assert_eq!(result.id, stored.id);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_leader_still_shares_its_computation() {
        let cache = Arc::new(InMemoryAnalysisCache::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let spawn_request = |label: &'static str| {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                let computation = async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(400)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(sample_result(label))
                }
                .boxed();
                cache.get_or_compute(key("k1"), TTL, computation).await
            })
        };

        let leader = spawn_request("leader");
        tokio::time::sleep(Duration::from_millis(30)).await;
        let follower = spawn_request("follower");
        tokio::time::sleep(Duration::from_millis(30)).await;
        leader.abort();
        let _ = leader.await;

        let result = follower.await.unwrap().unwrap();
        assert_eq!(result.survey_id.as_str(), "leader");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(cache.get(&key("k1")).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_requests_do_not_leak_in_flight_slots() {
        let cache = Arc::new(InMemoryAnalysisCache::new());

        let mut requests = Vec::new();
        for i in 0..50 {
            let cache = Arc::clone(&cache);
            requests.push(tokio::spawn(async move {
                let computation = async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(sample_result("s1"))
                }
                .boxed();
                cache.get_or_compute(key(&format!("k{}", i)), TTL, computation).await
            }));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.in_flight().await, 50);

        for request in requests {
            request.abort();
            let _ = request.await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.in_flight().await, 0);
        assert_eq!(cache.len().await, 50);
    }

    #[tokio::test]
    async fn panicking_computation_becomes_an_error() {
        let cache = InMemoryAnalysisCache::new();
        let computation = async {
            if computation_fails() {
                panic!("aggregation blew up");
            }
            Ok(sample_result("s1"))
        }
        .boxed();

        let err = cache.get_or_compute(key("k1"), TTL, computation).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Internal(_)));
        assert_eq!(cache.in_flight().await, 0);
        assert!(cache.is_empty().await);
    }

    fn computation_fails() -> bool {
        true
    }
}
