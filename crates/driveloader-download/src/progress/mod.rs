//! Transfer progress reporting.
//!
//! The downloader computes a `TransferProgress` after every chunk and hands
//! it to a `ProgressReporter`. Terminal rendering lives in the CLI.

mod throttle;

use std::time::Duration;

use driveloader_core::download::{DownloadError, TransferOutcome};

pub use throttle::ProgressThrottle;

/// Snapshot of one transfer after a chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    /// Bytes written so far.
    pub downloaded: u64,
    /// Declared size, if known.
    pub total: Option<u64>,
    /// Time since the first chunk was requested.
    pub elapsed: Duration,
    /// Average throughput in bytes per second; `None` while no time has passed.
    pub speed: Option<f64>,
    /// Estimated time left; zero once nothing remains, `None` if unknown.
    pub eta: Option<Duration>,
}

impl TransferProgress {
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(downloaded: u64, total: Option<u64>, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let speed = (secs > 0.0 && downloaded > 0).then(|| downloaded as f64 / secs);
        let remaining = total.map(|t| t.saturating_sub(downloaded));

        let eta = match (remaining, speed) {
            (Some(0), _) => Some(Duration::ZERO),
            (Some(left), Some(rate)) => Some(Duration::from_secs_f64(left as f64 / rate)),
            _ => None,
        };

        Self {
            downloaded,
            total,
            elapsed,
            speed,
            eta,
        }
    }

    /// Bytes still to go, when the total is known.
    pub fn remaining(&self) -> Option<u64> {
        self.total.map(|t| t.saturating_sub(self.downloaded))
    }

    /// Completion percentage (0-100), when the total is known and non-zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(0) | None => None,
            Some(total) => Some(self.downloaded.min(total) as f64 * 100.0 / total as f64),
        }
    }
}

/// Receives progress for each transfer.
///
/// Calls arrive from one task at a time, in order: `on_start`, any number of
/// `on_progress`, then `on_finish`.
pub trait ProgressReporter: Send + Sync {
    fn on_start(&self, _name: &str, _total: Option<u64>) {}

    fn on_progress(&self, progress: &TransferProgress);

    fn on_finish(&self, _name: &str, _result: Result<&TransferOutcome, &DownloadError>) {}
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_progress(&self, _progress: &TransferProgress) {}
}
