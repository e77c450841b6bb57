//! Commit debounce for final speech fragments.
//!
//! Each final fragment restarts the countdown; the accumulated transcript
//! only commits once a full window passes with no newer fragment. Time is
//! passed in explicitly so the timing contract is testable.

use std::time::{Duration, Instant};

/// Restartable deadline with a fixed window.
#[derive(Debug, Clone)]
pub struct CommitDebouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl CommitDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline at `now + window`. A later fragment
    /// always replaces the pending deadline rather than extending it.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// True once armed and the window has fully elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm without firing.
    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
