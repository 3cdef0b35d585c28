//! Drive client generic over its HTTP backend.

mod files;

use driveloader_core::ports::RemotePortError;
use url::Url;

use crate::config::DriveClientConfig;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::DriveConfig;
use crate::port::map_error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Drive client using the reqwest HTTP backend.
pub type DefaultDriveClient = DriveClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the Drive v3 REST API.
///
/// Generic over the HTTP backend so tests can inject canned responses.
/// Production code uses `DefaultDriveClient::new()`.
pub struct DriveClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: DriveConfig,
}

impl DefaultDriveClient {
    /// Create a client. Fails only on a malformed base URL or TLS setup.
    pub fn new(config: &DriveClientConfig) -> Result<Self, RemotePortError> {
        let internal_config = Self::to_internal_config(config)?;
        let backend = ReqwestBackend::new(config, &internal_config).map_err(map_error)?;
        Ok(Self {
            backend,
            config: internal_config,
        })
    }

    fn to_internal_config(config: &DriveClientConfig) -> Result<DriveConfig, RemotePortError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| RemotePortError::Configuration {
                message: format!("invalid Drive base URL '{}': {e}", config.base_url),
            })?;

        Ok(DriveConfig {
            base_url,
            token: config.token.clone(),
            max_retries: config.max_retries,
            #[allow(clippy::cast_possible_truncation)] // Duration milliseconds won't exceed u64 in practice
            retry_base_delay_ms: config.retry_base_delay.as_millis() as u64,
            page_size: config.page_size,
        })
    }
}

impl<B: HttpBackend> DriveClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: DriveConfig, backend: B) -> Self {
        Self { backend, config }
    }
}
