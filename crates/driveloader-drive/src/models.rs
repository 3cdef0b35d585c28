//! Internal API response types for Drive v3.
//!
//! External consumers see `RemoteObject` from `driveloader-core` instead.

use serde::Deserialize;
use url::Url;

// ============================================================================
// Configuration (used internally, see config.rs for public config)
// ============================================================================

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub base_url: Url,
    pub token: Option<String>,
    pub max_retries: u8,
    pub retry_base_delay_ms: u64,
    pub page_size: u16,
}

impl DriveConfig {
    /// Config pointing at the public endpoint, for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            base_url: Url::parse(crate::config::DEFAULT_BASE_URL).unwrap(),
            token: None,
            max_retries: 0,
            retry_base_delay_ms: 1,
            page_size: 1000,
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// One entry of `files.list` (only the requested fields).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Drive encodes int64 as a JSON string.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DriveFile {
    pub fn size_bytes(&self) -> Option<u64> {
        parse_size(self.size.as_deref())
    }
}

/// A page of `files.list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// `files.get` with `fields=size`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSize {
    #[serde(default)]
    pub size: Option<String>,
}

impl FileSize {
    pub fn bytes(&self) -> Option<u64> {
        parse_size(self.size.as_deref())
    }
}

fn parse_size(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse().ok())
}

// ============================================================================
// Errors
// ============================================================================

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Pull the most specific reason out of an error body.
pub fn error_reason(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .error
        .errors
        .into_iter()
        .find_map(|item| item.reason)
        .or(envelope.error.status)
}

// ============================================================================
// Media
// ============================================================================

/// Body of a media request plus what the headers said about it.
#[derive(Debug, Clone)]
pub struct MediaResponse {
    pub data: bytes::Bytes,
    /// True for `206 Partial Content`.
    pub partial: bool,
    /// Total object size from `Content-Range`, if the server reported it.
    pub total_size: Option<u64>,
}

/// Parse the total out of `Content-Range: bytes 0-99/1234`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}
