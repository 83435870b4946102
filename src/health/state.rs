//! Point-in-time view of the judge health tracker.

use serde::Serialize;

/// Copy of the tracker's timestamps; `0` means "never".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub last_success_ms: u64,
    pub last_failure_ms: u64,
}

impl HealthSnapshot {
    pub fn has_succeeded(&self) -> bool {
        self.last_success_ms > 0
    }

    pub fn has_failed(&self) -> bool {
        self.last_failure_ms > 0
    }
}
