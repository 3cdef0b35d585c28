//! HTTP backend abstraction for the Drive API.
//!
//! The production backend uses reqwest with retry for transient errors.
//! Tests swap in `testing::FakeBackend`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, RANGE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::DriveClientConfig;
use crate::error::{DriveError, DriveResult};
use crate::models::{DriveConfig, MediaResponse, error_reason, parse_content_range_total};

/// Inclusive byte range for a media request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Range covering `len` bytes from `offset`. `len` must be non-zero.
    pub const fn from_offset(offset: u64, len: u64) -> Self {
        Self {
            start: offset,
            end: offset + len.saturating_sub(1),
        }
    }

    fn header_value(self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends used by `DriveClient`.
///
/// Implementation detail; external code goes through `RemoteStorePort`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> DriveResult<T>;

    /// Fetch raw bytes, optionally restricted to `range`.
    async fn get_media(&self, url: &Url, range: Option<ByteRange>) -> DriveResult<MediaResponse>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// 5xx, 429 and network errors are retried with exponential backoff.
/// Ranged media reads are sent once: the chunked downloader retries each
/// chunk itself, inside its own per-chunk timeout.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay_ms: u64,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    pub fn new(public: &DriveClientConfig, config: &DriveConfig) -> DriveResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(public.timeout)
            .user_agent(public.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
            auth_token: config.token.clone(),
        })
    }

    fn build_request(&self, url: &Url, range: Option<ByteRange>) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url.as_str());
        if let Some(ref token) = self.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }
        request
    }

    const fn retries_for(&self, range: Option<ByteRange>) -> u8 {
        if range.is_some() {
            0
        } else {
            self.max_retries
        }
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(
        &self,
        url: &Url,
        range: Option<ByteRange>,
    ) -> DriveResult<reqwest::Response> {
        let max_retries = self.retries_for(range);
        let mut last_error: Option<DriveError> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(
                    self.retry_base_delay_ms * 2u64.pow(u32::from(attempt) - 1),
                );
                tracing::debug!(attempt, delay_ms = delay.as_millis(), url = %url, "Retrying Drive request");
                tokio::time::sleep(delay).await;
            }

            match self.build_request(url, range).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retryable =
                        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
                    if retryable && attempt < max_retries {
                        last_error = Some(DriveError::ApiRequestFailed {
                            status: status.as_u16(),
                            url: url.to_string(),
                            reason: None,
                        });
                        continue;
                    }

                    // 4xx or final attempt: the body says why
                    let body = response.text().await.unwrap_or_default();
                    return Err(DriveError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                        reason: error_reason(&body),
                    });
                }
                Err(e) => {
                    if attempt < max_retries {
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DriveError::InvalidResponse {
            message: "Unknown error during fetch".to_string(),
        }))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> DriveResult<T> {
        let response = self.fetch_with_retry(url, None).await?;
        let data: T = response.json().await?;
        Ok(data)
    }

    async fn get_media(&self, url: &Url, range: Option<ByteRange>) -> DriveResult<MediaResponse> {
        let response = self.fetch_with_retry(url, range).await?;
        let partial = response.status() == StatusCode::PARTIAL_CONTENT;
        let total_size = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range_total);
        let data = response.bytes().await?;
        Ok(MediaResponse {
            data,
            partial,
            total_size,
        })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Canned response for the fake backend.
    #[derive(Clone)]
    pub enum CannedResponse {
        /// JSON body with status 200.
        Json(serde_json::Value),
        /// Media body; ranges are served from it like a real server.
        Media(Bytes),
        /// Error status with an optional `errors[].reason`.
        Status { status: u16, reason: Option<String> },
    }

    /// A fake HTTP backend that returns canned responses.
    ///
    /// The longest registered pattern contained in the URL wins, so
    /// `pageToken=p2` can override a plain `files?` listing.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Vec<(String, CannedResponse)>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a canned response for a URL pattern.
        pub fn with_response(mut self, url_contains: &str, response: CannedResponse) -> Self {
            self.responses.push((url_contains.to_string(), response));
            self
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn find_response(&self, url: &Url) -> DriveResult<CannedResponse> {
            self.requests.lock().unwrap().push(url.to_string());
            // Compare against the decoded form so patterns can use plain text.
            let plus_as_space = url.as_str().replace('+', " ");
            let decoded = urlencoding::decode(&plus_as_space)
                .map_or_else(|_| url.to_string(), |s| s.into_owned());
            self.responses
                .iter()
                .filter(|(pattern, _)| decoded.contains(pattern.as_str()))
                .max_by_key(|(pattern, _)| pattern.len())
                .map(|(_, response)| response.clone())
                .ok_or_else(|| DriveError::ApiRequestFailed {
                    status: 404,
                    url: url.to_string(),
                    reason: Some("notFound".to_string()),
                })
        }

        fn status_error(url: &Url, status: u16, reason: Option<String>) -> DriveError {
            DriveError::ApiRequestFailed {
                status,
                url: url.to_string(),
                reason,
            }
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> DriveResult<T> {
            match self.find_response(url)? {
                CannedResponse::Json(json) => serde_json::from_value(json).map_err(Into::into),
                CannedResponse::Media(_) => Err(DriveError::InvalidResponse {
                    message: "expected JSON, got media".to_string(),
                }),
                CannedResponse::Status { status, reason } => {
                    Err(Self::status_error(url, status, reason))
                }
            }
        }

        async fn get_media(
            &self,
            url: &Url,
            range: Option<ByteRange>,
        ) -> DriveResult<MediaResponse> {
            match self.find_response(url)? {
                CannedResponse::Media(data) => {
                    let total = data.len() as u64;
                    let Some(range) = range else {
                        return Ok(MediaResponse {
                            data,
                            partial: false,
                            total_size: None,
                        });
                    };
                    if range.start >= total {
                        return Err(Self::status_error(url, 416, None));
                    }
                    let end = range.end.min(total - 1);
                    let start = usize::try_from(range.start).unwrap();
                    let end = usize::try_from(end).unwrap();
                    Ok(MediaResponse {
                        data: data.slice(start..=end),
                        partial: true,
                        total_size: Some(total),
                    })
                }
                CannedResponse::Json(json) => Ok(MediaResponse {
                    data: Bytes::from(json.to_string()),
                    partial: false,
                    total_size: None,
                }),
                CannedResponse::Status { status, reason } => {
                    Err(Self::status_error(url, status, reason))
                }
            }
        }
    }
}
