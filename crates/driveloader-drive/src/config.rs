//! Public configuration for the Drive client.
//!
//! The internal config is derived from this.

use std::time::Duration;

/// Default Drive v3 endpoint.
pub(crate) const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Configuration for the Drive client.
///
/// # Example
///
/// ```
/// use driveloader_drive::DriveClientConfig;
/// use std::time::Duration;
///
/// let config = DriveClientConfig::new()
///     .with_token("ya29.token")
///     .with_timeout(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct DriveClientConfig {
    /// Base URL for the Drive API
    pub(crate) base_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout (covers a whole chunk body)
    pub(crate) timeout: Duration,
    /// OAuth access token
    pub(crate) token: Option<String>,
    /// Maximum number of retry attempts for transient errors on listing,
    /// metadata and export requests. Ranged media reads are not retried here.
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
    /// Page size for listing calls
    pub(crate) page_size: u16,
}

impl Default for DriveClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("driveloader/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(120),
            token: None,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            page_size: 1000,
        }
    }
}

impl DriveClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL. Defaults to `https://www.googleapis.com/drive/v3`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout. Defaults to 120 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the OAuth access token sent as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the maximum number of retry attempts. Defaults to 3.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff. Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the listing page size (1..=1000). Defaults to 1000.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u16) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }
}
