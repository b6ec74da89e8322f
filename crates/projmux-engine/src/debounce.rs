//! Debounced propagation of discovery results to the UI sink.
//!
//! Coalesces bursts of completed ticks: the reconciliation itself always
//! runs to completion, only the push to the display is held back. Explicit
//! last-emitted timestamp + pending flag, with the clock injected, so the
//! coalescing logic is testable without real delays.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct UpdateDebouncer {
    min_interval: Duration,
    last_emitted: Option<DateTime<Utc>>,
    pending: bool,
}

impl UpdateDebouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_emitted: None,
            pending: false,
        }
    }

    /// Record that fresh results exist and want to reach the display.
    pub fn mark_dirty(&mut self) {
        self.pending = true;
    }

    /// True when a push should happen now. Clears the pending flag and
    /// stamps the emission time when it fires.
    pub fn should_emit(&mut self, now: DateTime<Utc>) -> bool {
        if !self.pending {
            return false;
        }
        let due = match self.last_emitted {
            None => true,
            Some(last) => now - last >= self.min_interval,
        };
        if due {
            self.pending = false;
            self.last_emitted = Some(now);
        }
        due
    }

    pub fn pending(&self) -> bool {
        self.pending
    }
}
