//! Single-flight compute cache.
//!
//! At most one computation runs per key; concurrent callers for an
//! in-flight key await the same outcome. Failures are cached like
//! successes, and entries live for the process lifetime.

use granite_core::CompileResult;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Keyed cache of computation outcomes
pub struct ComputeCache<K, V> {
    entries: Mutex<HashMap<K, Arc<OnceCell<CompileResult<V>>>>>,
}

impl<K, V> Default for ComputeCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> ComputeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached outcome for `key`, computing it at most once
    ///
    /// # Errors
    ///
    /// Replays `compute`'s failure, including for callers that never ran
    /// it.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> CompileResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CompileResult<V>>,
    {
        let cell = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        cell.get_or_init(compute).await.clone()
    }

    /// Check whether an outcome is already published for `key`
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|cell| cell.initialized())
    }

    /// Number of claimed keys, including in-flight ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether no key was ever claimed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> std::fmt::Debug for ComputeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeCache")
            .field("keys", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granite_core::CompileError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_computes_once_per_key() {
        let cache = ComputeCache::new();
        let runs = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("a", || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value, Ok(42));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let other = cache
            .get_or_compute("b", || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(other, Ok(7));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_sticky() {
        let cache: ComputeCache<&str, i32> = ComputeCache::new();
        let runs = AtomicUsize::new(0);

        for _ in 0..2 {
            let outcome = cache
                .get_or_compute("bad", || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Err(CompileError::CacheComputation {
                        message: "boom".to_string(),
                    })
                })
                .await;
            assert_eq!(outcome.unwrap_err().kind(), "cache_computation");
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&"bad"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_flight() {
        let cache: Arc<ComputeCache<String, String>> = Arc::new(ComputeCache::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_compute("shared".to_string(), || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok("payload".to_string())
                    })
                    .await
            }));
        }

        for task in tasks {
            let outcome = task.await.unwrap();
            assert_eq!(outcome, Ok("payload".to_string()));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }
}
