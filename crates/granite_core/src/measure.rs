//! Elapsed-time measurement.
//!
//! An append-only sample store and helpers that time an action without
//! touching its outcome. Samples are recorded on success and failure
//! alike.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// One recorded elapsed-time observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// What was measured (file path, node name, template source)
    pub key: String,
    /// Elapsed wall-clock time
    pub duration: Duration,
}

/// Append-only store of timing samples
///
/// Shared across threads; recording never fails and never blocks the
/// measured action beyond the append itself.
#[derive(Debug, Default)]
pub struct TimingStore {
    samples: RwLock<Vec<Sample>>,
}

impl TimingStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample
    pub fn record(&self, key: impl Into<String>, duration: Duration) {
        let sample = Sample {
            key: key.into(),
            duration,
        };
        if let Ok(mut samples) = self.samples.write() {
            samples.push(sample);
        }
    }

    /// Samples recorded under a key, in recording order
    #[must_use]
    pub fn samples_for(&self, key: &str) -> Vec<Sample> {
        match self.samples.read() {
            Ok(samples) => samples.iter().filter(|s| s.key == key).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Total number of recorded samples
    #[must_use]
    pub fn count(&self) -> usize {
        self.samples.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Sum of all recorded durations
    #[must_use]
    pub fn total(&self) -> Duration {
        match self.samples.read() {
            Ok(samples) => samples.iter().map(|s| s.duration).sum(),
            Err(_) => Duration::ZERO,
        }
    }

    /// Run a closure, recording its elapsed time under `key`
    ///
    /// The closure's result is returned unchanged.
    pub fn time<T>(&self, key: impl Into<String>, action: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = action();
        self.record(key, start.elapsed());
        result
    }

    /// Await a future, recording its elapsed time under `key`
    ///
    /// The future's output is returned unchanged.
    pub async fn time_async<T, F>(&self, key: impl Into<String>, action: F) -> T
    where
        F: Future<Output = T>,
    {
        let start = Instant::now();
        let result = action.await;
        self.record(key, start.elapsed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_query() {
        let store = TimingStore::new();
        store.record("parse", Duration::from_millis(5));
        store.record("parse", Duration::from_millis(7));
        store.record("render", Duration::from_millis(1));

        assert_eq!(store.count(), 3);
        assert_eq!(store.samples_for("parse").len(), 2);
        assert_eq!(store.total(), Duration::from_millis(13));
    }

    #[test]
    fn test_time_preserves_result() {
        let store = TimingStore::new();
        let value: Result<i32, String> = store.time("ok", || Ok(42));
        assert_eq!(value, Ok(42));

        let failure: Result<i32, String> = store.time("bad", || Err("boom".to_string()));
        assert!(failure.is_err());
        assert_eq!(store.count(), 2);
    }
}
