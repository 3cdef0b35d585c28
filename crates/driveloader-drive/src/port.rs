//! `RemoteStorePort` implementation for `DriveClient`.
//!
//! Converts between Drive API types and core DTOs, and maps `DriveError`
//! onto `RemotePortError`.

use async_trait::async_trait;
use bytes::Bytes;
use driveloader_core::domain::{ObjectKind, ObjectQuery, RemoteObject};
use driveloader_core::ports::{MediaChunk, RemotePortError, RemotePortResult, RemoteStorePort};

use crate::client::DriveClient;
use crate::error::DriveError;
use crate::http::HttpBackend;
use crate::models::DriveFile;
use crate::url::extract_file_id;

const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `DriveError` to core `RemotePortError`.
pub(crate) fn map_error(err: DriveError) -> RemotePortError {
    if err.is_not_downloadable() {
        if let DriveError::ApiRequestFailed { url, .. } = &err {
            return RemotePortError::NotDownloadable {
                id: extract_file_id(url).unwrap_or_else(|| url.clone()),
            };
        }
    }

    match err {
        DriveError::ApiRequestFailed {
            status,
            url,
            reason,
        } => {
            let rate_limited = reason
                .as_deref()
                .is_some_and(|r| RATE_LIMIT_REASONS.contains(&r));
            match status {
                404 => RemotePortError::NotFound {
                    id: extract_file_id(&url).unwrap_or(url),
                },
                429 => RemotePortError::RateLimited,
                403 if rate_limited => RemotePortError::RateLimited,
                401 | 403 => RemotePortError::AuthRequired {
                    message: reason.unwrap_or_else(|| format!("status {status}")),
                },
                _ => RemotePortError::Network {
                    message: format!("API request failed with status {status}: {url}"),
                },
            }
        }
        DriveError::InvalidResponse { message } => RemotePortError::InvalidResponse { message },
        DriveError::Network(e) => RemotePortError::Network {
            message: e.to_string(),
        },
        DriveError::InvalidUrl(e) => RemotePortError::Configuration {
            message: e.to_string(),
        },
        DriveError::JsonParse(e) => RemotePortError::InvalidResponse {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Type Conversions
// ============================================================================

fn to_remote_object(file: DriveFile) -> RemoteObject {
    let kind = file
        .mime_type
        .as_deref()
        .map_or(ObjectKind::File, ObjectKind::from_mime_type);
    let size = file.size_bytes();

    let mut object = RemoteObject::new(file.id, file.name, kind);
    if let Some(size) = size {
        object = object.with_size(size);
    }
    if let Some(parent) = file.parents.into_iter().next() {
        object = object.with_parent(parent);
    }
    if let Some(mime_type) = file.mime_type {
        object = object.with_mime_type(mime_type);
    }
    object
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend + Send + Sync> RemoteStorePort for DriveClient<B> {
    async fn list(&self, query: &ObjectQuery) -> RemotePortResult<Vec<RemoteObject>> {
        let files = self
            .list_files(&query.to_query_string())
            .await
            .map_err(map_error)?;
        Ok(files.into_iter().map(to_remote_object).collect())
    }

    async fn object_size(&self, id: &str) -> RemotePortResult<Option<u64>> {
        self.file_size(id).await.map_err(map_error)
    }

    async fn fetch_chunk(&self, id: &str, offset: u64, len: u64) -> RemotePortResult<MediaChunk> {
        let response = self
            .download_range(id, offset, len)
            .await
            .map_err(map_error)?;
        Ok(MediaChunk::new(response.data, response.total_size))
    }

    async fn export(&self, id: &str, mime_type: &str) -> RemotePortResult<Bytes> {
        self.export_file(id, mime_type).await.map_err(map_error)
    }
}
