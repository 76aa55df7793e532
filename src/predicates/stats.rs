// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Diagnostic counters for the predicate engine

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters shared by every evaluation that receives them.
///
/// They measure how often the floating-point filter fails and how often
/// inputs hit an exact boundary case; they never influence a result.
#[derive(Debug, Default)]
pub struct PredicateStats {
    calls: AtomicU64,
    exact_calls: AtomicU64,
    degeneracies: AtomicU64,
}

/// Point-in-time copy of [`PredicateStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total predicate calls
    pub calls: u64,
    /// Calls where the filter was inconclusive and exact arithmetic ran
    pub exact_calls: u64,
    /// Calls decided by an exact zero (boundary-incident configurations)
    pub degeneracies: u64,
}

impl StatsSnapshot {
    /// Fraction of calls the filter decided on its own
    pub fn filter_hit_rate(&self) -> f64 {
        if self.calls == 0 {
            return 1.0;
        }
        1.0 - self.exact_calls as f64 / self.calls as f64
    }
}

impl PredicateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exact(&self) {
        self.exact_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_degeneracy(&self) {
        self.degeneracies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            exact_calls: self.exact_calls.load(Ordering::Relaxed),
            degeneracies: self.degeneracies.load(Ordering::Relaxed),
        }
    }

    /// Explicit reset; the only way the counters go down
    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.exact_calls.store(0, Ordering::Relaxed);
        self.degeneracies.store(0, Ordering::Relaxed);
    }
}
