//! File listing, metadata, media and export calls.

use bytes::Bytes;

use crate::error::{DriveError, DriveResult};
use crate::http::{ByteRange, HttpBackend};
use crate::models::{DriveFile, FileList, FileSize, MediaResponse};
use crate::url::{build_export_url, build_list_url, build_media_url, build_size_url};

use super::DriveClient;

const RANGE_NOT_SATISFIABLE: u16 = 416;

impl<B: HttpBackend> DriveClient<B> {
    /// Run `query` and follow `nextPageToken` until the listing is exhausted.
    pub(crate) async fn list_files(&self, query: &str) -> DriveResult<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let url = build_list_url(&self.config, query, page_token.as_deref());
            let page: FileList = self.backend.get_json(&url).await?;
            pages += 1;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if page_token.as_deref() == Some(token.as_str()) {
                        return Err(DriveError::InvalidResponse {
                            message: format!("listing returned the same page token twice: {token}"),
                        });
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        tracing::debug!(query, pages, count = files.len(), "Listed Drive files");
        Ok(files)
    }

    /// Declared size of a file; `None` for folders and Google documents.
    pub(crate) async fn file_size(&self, id: &str) -> DriveResult<Option<u64>> {
        let url = build_size_url(&self.config, id);
        let meta: FileSize = self.backend.get_json(&url).await?;
        Ok(meta.bytes())
    }

    /// Read `len` bytes of content from `offset`.
    ///
    /// A range starting at or past the end yields an empty response.
    pub(crate) async fn download_range(
        &self,
        id: &str,
        offset: u64,
        len: u64,
    ) -> DriveResult<MediaResponse> {
        if len == 0 {
            return Ok(empty_media());
        }

        let url = build_media_url(&self.config, id);
        match self
            .backend
            .get_media(&url, Some(ByteRange::from_offset(offset, len)))
            .await
        {
            Ok(response) if response.partial => Ok(response),
            // Server ignored the Range header and sent the whole body.
            Ok(response) => Ok(MediaResponse {
                total_size: Some(response.data.len() as u64),
                data: slice_range(&response.data, offset, len),
                partial: true,
            }),
            Err(DriveError::ApiRequestFailed { status, .. }) if status == RANGE_NOT_SATISFIABLE => {
                Ok(empty_media())
            }
            Err(e) => Err(e),
        }
    }

    /// Export a Google document to `mime_type`.
    pub(crate) async fn export_file(&self, id: &str, mime_type: &str) -> DriveResult<Bytes> {
        let url = build_export_url(&self.config, id, mime_type);
        let response = self.backend.get_media(&url, None).await?;
        Ok(response.data)
    }
}

const fn empty_media() -> MediaResponse {
    MediaResponse {
        data: Bytes::new(),
        partial: true,
        total_size: None,
    }
}

fn slice_range(data: &Bytes, offset: u64, len: u64) -> Bytes {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
    let end = start
        .saturating_add(usize::try_from(len).unwrap_or(usize::MAX))
        .min(data.len());
    data.slice(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use crate::models::DriveConfig;
    use serde_json::json;

    fn client(backend: FakeBackend) -> DriveClient<FakeBackend> {
        DriveClient::with_backend(DriveConfig::for_tests(), backend)
    }

    #[tokio::test]
    async fn test_list_files_follows_pagination() {
        let backend = FakeBackend::new()
            .with_response(
                "q=name contains 'a'",
                CannedResponse::Json(json!({
                    "nextPageToken": "p2",
                    "files": [{"id": "1", "name": "a1"}]
                })),
            )
            .with_response(
                "pageSize=1000&pageToken=p2",
                CannedResponse::Json(json!({"files": [{"id": "2", "name": "a2"}]})),
            );
        let client = client(backend);

        let files = client
            .list_files("name contains 'a' and trashed = false")
            .await
            .unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(client.backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_list_files_rejects_repeated_token() {
        let backend = FakeBackend::new().with_response(
            "files?",
            CannedResponse::Json(json!({"nextPageToken": "loop", "files": []})),
        );
        let err = client(backend).list_files("trashed = false").await.unwrap_err();
        assert!(matches!(err, DriveError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_file_size() {
        let backend = FakeBackend::new()
            .with_response("files/big?fields=size", CannedResponse::Json(json!({"size": "4096"})))
            .with_response("files/doc?fields=size", CannedResponse::Json(json!({})));
        let client = client(backend);

        assert_eq!(client.file_size("big").await.unwrap(), Some(4096));
        assert_eq!(client.file_size("doc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_download_range_past_end_is_empty() {
        let backend = FakeBackend::new().with_response(
            "files/x?alt=media",
            CannedResponse::Media(Bytes::from_static(b"abc")),
        );
        let client = client(backend);

        let chunk = client.download_range("x", 0, 2).await.unwrap();
        assert_eq!(&chunk.data[..], b"ab");
        let chunk = client.download_range("x", 3, 2).await.unwrap();
        assert!(chunk.data.is_empty());
    }

    #[tokio::test]
    async fn test_download_range_passes_rejection_through() {
        let backend = FakeBackend::new().with_response(
            "files/doc?alt=media",
            CannedResponse::Status {
                status: 403,
                reason: Some("fileNotDownloadable".to_string()),
            },
        );
        let err = client(backend).download_range("doc", 0, 10).await.unwrap_err();
        assert!(err.is_not_downloadable());
    }

    #[tokio::test]
    async fn test_export_file() {
        let backend = FakeBackend::new().with_response(
            "files/doc/export",
            CannedResponse::Media(Bytes::from_static(b"PK\x03\x04")),
        );
        let data = client(backend)
            .export_file("doc", "application/pdf")
            .await
            .unwrap();
        assert_eq!(&data[..], b"PK\x03\x04");
    }

    #[test]
    fn test_slice_range() {
        let data = Bytes::from_static(b"0123456789");
        assert_eq!(&slice_range(&data, 2, 3)[..], b"234");
        assert_eq!(&slice_range(&data, 8, 5)[..], b"89");
        assert!(slice_range(&data, 20, 5).is_empty());
    }
}
