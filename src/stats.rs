//! Error statistics sinks.
//!
//! The analyzer reports every result to a [`StatsSink`]. Classification
//! itself never reads stats back.

use crate::category::ErrorCategory;
use crate::result::ClassificationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard};

/// Receiver of classification results.
pub trait StatsSink: Debug + Send + Sync {
    fn record(&self, result: &ClassificationResult);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStats;

impl StatsSink for NoopStats {
    fn record(&self, _result: &ClassificationResult) {}
}

/// Counters for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub count: u64,
    pub retryable: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Thread-safe in-process counters per category.
#[derive(Debug, Default)]
pub struct InMemoryStats {
    inner: Mutex<BTreeMap<ErrorCategory, CategoryStats>>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> BTreeMap<ErrorCategory, CategoryStats> {
        self.lock().clone()
    }

    /// Number of results recorded since creation or the last reset.
    pub fn total(&self) -> u64 {
        self.lock().values().map(|s| s.count).sum()
    }

    pub fn count(&self, category: ErrorCategory) -> u64 {
        self.lock().get(&category).map_or(0, |s| s.count)
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock leaves the counters consistent, so the
    // poison flag is ignored.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<ErrorCategory, CategoryStats>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatsSink for InMemoryStats {
    fn record(&self, result: &ClassificationResult) {
        let now = Utc::now();
        let mut stats = self.lock();
        let entry = stats.entry(result.category).or_insert(CategoryStats {
            count: 0,
            retryable: 0,
            first_seen: now,
            last_seen: now,
        });
        entry.count += 1;
        if result.is_retryable {
            entry.retryable += 1;
        }
        entry.last_seen = now;
    }
}
