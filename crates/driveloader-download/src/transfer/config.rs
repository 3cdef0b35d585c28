//! Tunables for one transfer.

use std::time::Duration;

use driveloader_core::domain::ExportFormat;
use driveloader_core::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Bytes requested per ranged read.
    pub chunk_size: u64,
    /// Upper bound on a single chunk request.
    pub chunk_timeout: Duration,
    /// Retries for one chunk after the first attempt.
    pub max_chunk_retries: u8,
    /// Backoff base; attempt `n` waits `base * 2^(n-1)`.
    pub retry_base_delay: Duration,
    /// Export format for documents without an obvious office equivalent.
    pub export_format: ExportFormat,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl TransferConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            chunk_size: settings.effective_chunk_size(),
            chunk_timeout: settings.effective_chunk_timeout(),
            max_chunk_retries: settings.effective_max_chunk_retries(),
            retry_base_delay: settings.effective_retry_base_delay(),
            export_format: settings.effective_export_format(),
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u8) -> Duration {
        let factor = 2u32.saturating_pow(u32::from(attempt.saturating_sub(1)));
        self.retry_base_delay.saturating_mul(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_settings() {
        let config = TransferConfig::default();
        assert_eq!(config.chunk_size, 10 * 1024 * 1024);
        assert_eq!(config.chunk_timeout, Duration::from_secs(120));
        assert_eq!(config.max_chunk_retries, 3);
        assert_eq!(config.export_format, ExportFormat::Docx);
    }

    #[test]
    fn test_backoff_doubles() {
        let config = TransferConfig {
            retry_base_delay: Duration::from_millis(100),
            ..TransferConfig::default()
        };
        assert_eq!(config.backoff(1), Duration::from_millis(100));
        assert_eq!(config.backoff(2), Duration::from_millis(200));
        assert_eq!(config.backoff(3), Duration::from_millis(400));
    }
}
