//! Progress throttling.
//!
//! A fast link produces far more chunks per second than a terminal can
//! usefully redraw. The throttle lets one update through per interval, plus
//! the first and the final update of every transfer.

use std::time::{Duration, Instant};

use super::TransferProgress;

pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Check whether `progress` should be shown.
    pub fn should_emit(&mut self, progress: &TransferProgress) -> bool {
        let now = Instant::now();
        let finished = progress.remaining() == Some(0);
        let due = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= self.min_interval);

        if due || finished {
            self.last_emit = Some(now);
            true
        } else {
            false
        }
    }

    /// Start over for a new transfer.
    pub const fn reset(&mut self) {
        self.last_emit = None;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}
