use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::Serialize;

/// Process counters for the progress service. Clones share the counters.
#[derive(Clone, Default)]
pub struct EngineMetrics {
    pub submissions_validated: Arc<AtomicU64>,
    pub submissions_rejected: Arc<AtomicU64>,
    pub skill_updates: Arc<AtomicU64>,
    /// Accepted submissions whose day had already been credited.
    pub duplicate_days_skipped: Arc<AtomicU64>,
    pub task_regenerations: Arc<AtomicU64>,
    pub advice_failures: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub submissions_validated: u64,
    pub submissions_rejected: u64,
    pub skill_updates: u64,
    pub duplicate_days_skipped: u64,
    pub task_regenerations: u64,
    pub advice_failures: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_validation(&self, accepted: bool) {
        self.submissions_validated.fetch_add(1, Ordering::Relaxed);
        if !accepted {
            self.submissions_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_skill_update(&self) {
        self.skill_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_day(&self) {
        self.duplicate_days_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_regeneration(&self) {
        self.task_regenerations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_advice_failure(&self) {
        self.advice_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions_validated: self.submissions_validated.load(Ordering::Relaxed),
            submissions_rejected: self.submissions_rejected.load(Ordering::Relaxed),
            skill_updates: self.skill_updates.load(Ordering::Relaxed),
            duplicate_days_skipped: self.duplicate_days_skipped.load(Ordering::Relaxed),
            task_regenerations: self.task_regenerations.load(Ordering::Relaxed),
            advice_failures: self.advice_failures.load(Ordering::Relaxed),
        }
    }
}
