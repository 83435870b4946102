//! Judge health tracking.
//!
//! Records when the judge last produced a passing verdict and when it last
//! failed, and derives a readiness flag from the age of the last success.
//! One tracker lives in the server state for the lifetime of the process;
//! it is never reset except by a restart.

mod state;

#[cfg(test)]
mod tests;

pub use state::*;

use std::sync::atomic::{AtomicU64, Ordering};

/// Default freshness window for [`HealthTracker::is_ready`].
pub const DEFAULT_READY_WINDOW_MS: u64 = 60_000;

/// Last-success / last-failure timestamps in epoch milliseconds.
///
/// Both fields are independently overwritten (last write wins), so plain
/// atomics are enough; no ordering between the two is promised.
#[derive(Debug, Default)]
pub struct HealthTracker {
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful judgment at the current wall-clock time.
    pub fn record_success(&self) {
        self.record_success_at(now_ms());
    }

    /// Record a failed judgment at the current wall-clock time.
    pub fn record_failure(&self) {
        self.record_failure_at(now_ms());
    }

    pub fn record_success_at(&self, epoch_ms: u64) {
        self.last_success_ms.store(epoch_ms, Ordering::Relaxed);
    }

    pub fn record_failure_at(&self, epoch_ms: u64) {
        self.last_failure_ms.store(epoch_ms, Ordering::Relaxed);
    }

    /// True when a success was recorded within `window_ms` of now.
    pub fn is_ready(&self, window_ms: u64) -> bool {
        self.is_ready_at(now_ms(), window_ms)
    }

    /// Readiness evaluated against an explicit clock reading.
    ///
    /// A success stamped after `now_ms` (clock skew) still counts as fresh.
    pub fn is_ready_at(&self, now_ms: u64, window_ms: u64) -> bool {
        let last_success = self.last_success_ms.load(Ordering::Relaxed);
        if last_success == 0 {
            return false;
        }
        now_ms.saturating_sub(last_success) <= window_ms
    }

    /// Read-only copy of both timestamps.
    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            last_success_ms: self.last_success_ms.load(Ordering::Relaxed),
            last_failure_ms: self.last_failure_ms.load(Ordering::Relaxed),
        }
    }
}

/// Current wall-clock time in epoch milliseconds (0 if the clock reads before 1970).
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
