//! Internal error types for Drive operations.
//!
//! These errors never leave `driveloader-drive`; `port.rs` maps them to
//! `RemotePortError` at the boundary.

use thiserror::Error;

pub type DriveResult<T> = Result<T, DriveError>;

/// Reason Drive reports when raw content download is refused.
pub const FILE_NOT_DOWNLOADABLE: &str = "fileNotDownloadable";

#[derive(Debug, Error)]
pub enum DriveError {
    /// API request failed with an HTTP error status.
    #[error("Drive API request failed with status {status}: {url}{}", reason_suffix(.reason.as_deref()))]
    ApiRequestFailed {
        status: u16,
        url: String,
        /// First `error.errors[].reason` from the response body, if any.
        reason: Option<String>,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from Drive API: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl DriveError {
    /// True when the object exists but only export can produce its content.
    pub fn is_not_downloadable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequestFailed { status: 400 | 403, reason: Some(reason), .. }
                if reason == FILE_NOT_DOWNLOADABLE
        )
    }
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(" ({r})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_message() {
        let error = DriveError::ApiRequestFailed {
            status: 403,
            url: "https://www.googleapis.com/drive/v3/files/abc?alt=media".to_string(),
            reason: Some(FILE_NOT_DOWNLOADABLE.to_string()),
        };
        let msg = error.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("(fileNotDownloadable)"));
    }

    #[test]
    fn test_is_not_downloadable() {
        let rejected = DriveError::ApiRequestFailed {
            status: 403,
            url: String::new(),
            reason: Some(FILE_NOT_DOWNLOADABLE.to_string()),
        };
        assert!(rejected.is_not_downloadable());

        let forbidden = DriveError::ApiRequestFailed {
            status: 403,
            url: String::new(),
            reason: Some("insufficientPermissions".to_string()),
        };
        assert!(!forbidden.is_not_downloadable());

        let server = DriveError::ApiRequestFailed {
            status: 500,
            url: String::new(),
            reason: Some(FILE_NOT_DOWNLOADABLE.to_string()),
        };
        assert!(!server.is_not_downloadable());
    }
}
