//! Transaction metrics
//!
//! Every counter uses Relaxed ordering. They are observational only and
//! synchronize nothing else.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live transaction counters shared by a store and its transactions
#[derive(Debug, Default)]
pub struct TransactionCounters {
    active_count: AtomicU64,
    total_started: AtomicU64,
    total_committed: AtomicU64,
    total_rolled_back: AtomicU64,
}

impl TransactionCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction (or re-initialised transaction) starting
    pub fn record_start(&self) {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        self.total_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful commit
    pub fn record_commit(&self) {
        self.decrement_active();
        self.total_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rollback or failed commit
    pub fn record_rollback(&self) {
        self.decrement_active();
        self.total_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    fn decrement_active(&self) {
        // Saturating: never underflow
        let _ = self
            .active_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
                Some(x.saturating_sub(1))
            });
    }

    /// Current values
    pub fn snapshot(&self) -> TransactionMetrics {
        let started = self.total_started.load(Ordering::Relaxed);
        let committed = self.total_committed.load(Ordering::Relaxed);

        TransactionMetrics {
            active_count: self.active_count.load(Ordering::Relaxed),
            total_started: started,
            total_committed: committed,
            total_rolled_back: self.total_rolled_back.load(Ordering::Relaxed),
            commit_rate: if started > 0 {
                committed as f64 / started as f64
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time transaction statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMetrics {
    /// Transactions currently active
    pub active_count: u64,
    /// Transactions started, re-initialisations after commit included
    pub total_started: u64,
    /// Successful commits
    pub total_committed: u64,
    /// Rollbacks and failed commits
    pub total_rolled_back: u64,
    /// Committed / started (0.0 when nothing started)
    pub commit_rate: f64,
}
