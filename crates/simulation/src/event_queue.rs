//! Deterministic ordering for queued inputs.

use crate::ApIndex;
use netsteer_core::EventPriority;
use std::cmp::Ordering;
use std::time::Duration;

/// Key ordering inputs in the harness queue.
///
/// Inputs are processed by:
/// 1. Time (earlier first)
/// 2. Priority (timers before network before driver)
/// 3. AP index
/// 4. Sequence number (FIFO for ties)
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct EventKey {
    /// When the input becomes due.
    pub time: Duration,
    /// Priority class at the same time.
    pub priority: EventPriority,
    /// Which AP receives the input.
    pub ap: ApIndex,
    /// Tie-breaker preserving insertion order.
    pub sequence: u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then(self.priority.cmp(&other.priority))
            .then(self.ap.cmp(&other.ap))
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
