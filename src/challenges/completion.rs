//! Mini-game end-of-life bookkeeping: overall timeout, finish outcome and
//! the settle delay before the completion callback fires.

use super::score::Outcome;
use super::Callback;
use log::debug;

pub struct Completion {
    timeout_ms: u64,
    settle_ms: u64,
    started_at: Option<u64>,
    finished_at: Option<u64>,
    outcome: Option<Outcome>,
    on_done: Option<Callback>,
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("timeout_ms", &self.timeout_ms)
            .field("settle_ms", &self.settle_ms)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .field("outcome", &self.outcome)
            .field("fired", &self.on_done.is_none())
            .finish()
    }
}

impl Completion {
    /// `timeout_ms == 0` disables the time limit.
    pub fn new(on_done: Callback, timeout_ms: u64, settle_ms: u64) -> Self {
        Self {
            timeout_ms,
            settle_ms,
            started_at: None,
            finished_at: None,
            outcome: None,
            on_done: Some(on_done),
        }
    }

    /// Note a frame timestamp. The first one starts the clock.
    pub fn observe(&mut self, timestamp_ms: u64) {
        if self.started_at.is_none() {
            self.started_at = Some(timestamp_ms);
        }
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    /// Play time up to `timestamp_ms`, frozen once finished.
    pub fn elapsed(&self, timestamp_ms: u64) -> u64 {
        let end = self.finished_at.unwrap_or(timestamp_ms);
        self.started_at.map_or(0, |s| end.saturating_sub(s))
    }

    pub fn remaining(&self, timestamp_ms: u64) -> Option<u64> {
        if self.timeout_ms == 0 {
            return None;
        }
        Some(self.timeout_ms.saturating_sub(self.elapsed(timestamp_ms)))
    }

    pub fn timed_out(&self, timestamp_ms: u64) -> bool {
        self.timeout_ms > 0
            && self
                .started_at
                .is_some_and(|s| timestamp_ms.saturating_sub(s) >= self.timeout_ms)
    }

    /// Record the end of play. Only the first call counts.
    pub fn finish(&mut self, outcome: Outcome, timestamp_ms: u64) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        debug!("mini-game finished: {:?}", outcome);
        self.observe(timestamp_ms);
        self.outcome = Some(outcome);
        self.finished_at = Some(timestamp_ms);
        true
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Fire the completion callback once the settle delay has passed.
    /// Returns true on the one call that fires it.
    pub fn poll(&mut self, timestamp_ms: u64) -> bool {
        let Some(finished_at) = self.finished_at else {
            return false;
        };
        if timestamp_ms < finished_at + self.settle_ms {
            return false;
        }
        match self.on_done.take() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.on_done.is_none()
    }
}
