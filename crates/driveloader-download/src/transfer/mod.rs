//! Chunked transfer of one object to one local file.
//!
//! The object's content is pulled in fixed-size ranged reads until the
//! declared size is reached (or a short read marks the end when no size is
//! known). Each read is bounded by a timeout and retried with exponential
//! backoff at the same offset. Documents the store refuses to serve raw are
//! exported once instead; a failed export fails the item.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use driveloader_core::domain::{ExportFormat, RemoteObject};
use driveloader_core::download::{DownloadError, DownloadResult, TransferOutcome};
use driveloader_core::ports::{MediaChunk, RemotePortError, RemoteStorePort};
use driveloader_core::utils::format_size;

use crate::progress::{ProgressReporter, TransferProgress};

pub use config::TransferConfig;

/// Why a chunk could not be fetched.
enum ChunkFailure {
    /// The store will not serve raw bytes for this object.
    Rejected,
    Cancelled,
    Failed(String),
}

pub struct ChunkedDownloader {
    store: Arc<dyn RemoteStorePort>,
    config: TransferConfig,
}

impl ChunkedDownloader {
    pub fn new(store: Arc<dyn RemoteStorePort>, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Transfer `object` to `dest`.
    ///
    /// On failure or cancellation (`Interrupted`) whatever was written is
    /// left in place; deciding whether to delete it is the caller's job.
    pub async fn download(
        &self,
        object: &RemoteObject,
        dest: &Path,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> DownloadResult<TransferOutcome> {
        let started = Instant::now();
        let declared = self.store.object_size(&object.id).await?;
        tracing::info!(
            name = %object.name,
            size = %declared.map_or_else(|| "unknown size".to_string(), format_size),
            dest = %dest.display(),
            "Downloading"
        );
        reporter.on_start(&object.name, declared);

        let result = self
            .transfer(object, dest, declared, reporter, cancel, started)
            .await;

        tracing::debug!(
            name = %object.name,
            elapsed_ms = started.elapsed().as_millis(),
            ok = result.is_ok(),
            "Transfer finished"
        );
        reporter.on_finish(&object.name, result.as_ref());
        result
    }

    async fn transfer(
        &self,
        object: &RemoteObject,
        dest: &Path,
        declared: Option<u64>,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
        started: Instant,
    ) -> DownloadResult<TransferOutcome> {
        let mut total = declared;
        let mut offset = 0u64;
        let mut file: Option<File> = None;

        loop {
            if total.is_some_and(|t| offset >= t) {
                break;
            }

            let chunk = match self.fetch_with_retry(&object.id, offset, cancel).await {
                Ok(chunk) => chunk,
                Err(ChunkFailure::Rejected) if offset == 0 => {
                    return self.export_fallback(object, dest, cancel).await;
                }
                Err(ChunkFailure::Rejected) => {
                    return Err(DownloadError::transfer_rejected(
                        &object.name,
                        format!("store stopped serving content at byte {offset}"),
                    ));
                }
                Err(ChunkFailure::Cancelled) => {
                    if let Some(mut f) = file {
                        f.flush().await.ok();
                    }
                    return Err(DownloadError::Interrupted {
                        bytes_written: offset,
                    });
                }
                Err(ChunkFailure::Failed(message)) => return Err(DownloadError::remote(message)),
            };

            if total.is_none() {
                total = chunk.total_size;
            }
            if chunk.is_empty() {
                if let Some(t) = total.filter(|&t| offset < t) {
                    return Err(DownloadError::remote(format!(
                        "transfer of '{}' ended at {offset} of {t} bytes",
                        object.name
                    )));
                }
                break;
            }

            let mut writer = match file.take() {
                Some(writer) => writer,
                None => File::create(dest).await?,
            };
            writer.write_all(&chunk.data).await?;
            file = Some(writer);
            offset += chunk.len();

            reporter.on_progress(&TransferProgress::compute(offset, total, started.elapsed()));

            if total.is_none() && chunk.len() < self.config.chunk_size {
                break;
            }
        }

        match file {
            Some(mut f) => {
                f.flush().await?;
                f.sync_all().await?;
            }
            // Zero-byte object: still leave a file behind.
            None => {
                File::create(dest).await?;
            }
        }

        Ok(TransferOutcome {
            success: true,
            bytes_written: offset,
            fallback_used: false,
            final_path: dest.to_path_buf(),
        })
    }

    async fn fetch_with_retry(
        &self,
        id: &str,
        offset: u64,
        cancel: &CancellationToken,
    ) -> Result<MediaChunk, ChunkFailure> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_chunk_retries {
            if attempt > 0 {
                let delay = self.config.backoff(attempt);
                tracing::debug!(id, offset, attempt, delay_ms = delay.as_millis(), "Retrying chunk");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(ChunkFailure::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }

            let request = tokio::time::timeout(
                self.config.chunk_timeout,
                self.store.fetch_chunk(id, offset, self.config.chunk_size),
            );
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ChunkFailure::Cancelled),
                result = request => result,
            };

            match result {
                Ok(Ok(chunk)) => return Ok(chunk),
                Ok(Err(RemotePortError::NotDownloadable { .. })) => {
                    return Err(ChunkFailure::Rejected);
                }
                Ok(Err(e)) if e.is_retryable() => {
                    tracing::warn!(id, offset, attempt, error = %e, "Chunk request failed");
                    last_error = e.to_string();
                }
                Ok(Err(e)) => return Err(ChunkFailure::Failed(e.to_string())),
                Err(_) => {
                    tracing::warn!(
                        id,
                        offset,
                        attempt,
                        timeout_secs = self.config.chunk_timeout.as_secs(),
                        "Chunk request timed out"
                    );
                    last_error = format!(
                        "chunk at byte {offset} timed out after {}s",
                        self.config.chunk_timeout.as_secs()
                    );
                }
            }
        }

        Err(ChunkFailure::Failed(format!(
            "giving up after {} attempts: {last_error}",
            u16::from(self.config.max_chunk_retries) + 1
        )))
    }

    async fn export_fallback(
        &self,
        object: &RemoteObject,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> DownloadResult<TransferOutcome> {
        let format = ExportFormat::for_document(object.mime_type.as_deref(), self.config.export_format);
        let path = export_path(dest, format);
        tracing::info!(
            name = %object.name,
            format = %format,
            "Not binary-downloadable, exporting"
        );

        let request = tokio::time::timeout(
            self.config.chunk_timeout,
            self.store.export(&object.id, format.mime_type()),
        );
        let data = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(DownloadError::Interrupted { bytes_written: 0 }),
            result = request => match result {
                Ok(Ok(data)) => data,
                Ok(Err(e)) => return Err(DownloadError::transfer_rejected(&object.name, e.to_string())),
                Err(_) => {
                    return Err(DownloadError::transfer_rejected(
                        &object.name,
                        format!("export timed out after {}s", self.config.chunk_timeout.as_secs()),
                    ));
                }
            },
        };

        tokio::fs::write(&path, &data).await?;
        Ok(TransferOutcome {
            success: true,
            bytes_written: data.len() as u64,
            fallback_used: true,
            final_path: path,
        })
    }
}

/// `dest` with its extension swapped for the export format's.
///
/// Only a short alphanumeric suffix counts as an extension, so a document
/// called `Dr. Strangelove notes` becomes `Dr. Strangelove notes.docx`.
pub fn export_path(dest: &Path, format: ExportFormat) -> PathBuf {
    let looks_like_extension = dest.extension().and_then(|e| e.to_str()).is_some_and(|e| {
        (1..=5).contains(&e.len()) && e.chars().all(|c| c.is_ascii_alphanumeric())
    });

    if looks_like_extension {
        dest.with_extension(format.extension())
    } else {
        let mut name = dest.as_os_str().to_os_string();
        name.push(".");
        name.push(format.extension());
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use tempfile::tempdir;

    use driveloader_core::domain::ObjectKind;

    use super::*;
    use crate::progress::NoopReporter;
    use crate::testing::FakeStore;

    fn config() -> TransferConfig {
        TransferConfig {
            chunk_size: 4,
            chunk_timeout: Duration::from_secs(1),
            max_chunk_retries: 3,
            retry_base_delay: Duration::from_millis(10),
            export_format: ExportFormat::Docx,
        }
    }

    fn object(id: &str, name: &str) -> RemoteObject {
        RemoteObject::new(id, name, ObjectKind::File)
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressReporter for Recorder {
        fn on_start(&self, name: &str, total: Option<u64>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {name} {total:?}"));
        }

        fn on_progress(&self, progress: &TransferProgress) {
            self.events
                .lock()
                .unwrap()
                .push(format!("progress {}", progress.downloaded));
        }

        fn on_finish(&self, name: &str, result: Result<&TransferOutcome, &DownloadError>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish {name} {}", result.is_ok()));
        }
    }

    #[tokio::test]
    async fn test_downloads_in_chunks() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FakeStore::new().with_file("a", "a.txt", None, "0123456789"));
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let recorder = Recorder::default();
        let dest = dir.path().join("a.txt");

        let outcome = downloader
            .download(&object("a", "a.txt"), &dest, &recorder, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(!outcome.fallback_used);
        assert_eq!(outcome.bytes_written, 10);
        assert_eq!(outcome.final_path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"0123456789");
        assert_eq!(store.chunk_calls(), 3);
        assert_eq!(
            recorder.events(),
            vec![
                "start a.txt Some(10)",
                "progress 4",
                "progress 8",
                "progress 10",
                "finish a.txt true",
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_byte_object_creates_empty_file() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FakeStore::new().with_file("e", "empty.txt", None, ""));
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let dest = dir.path().join("empty.txt");

        let outcome = downloader
            .download(&object("e", "empty.txt"), &dest, &NoopReporter, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.bytes_written, 0);
        assert!(dest.exists());
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
        assert_eq!(store.chunk_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_errors_are_retried_at_same_offset() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FakeStore::new()
                .with_file("a", "a.txt", None, "abcdef")
                .fail_chunks(
                    "a",
                    vec![
                        RemotePortError::RateLimited,
                        RemotePortError::Network {
                            message: "reset".to_string(),
                        },
                    ],
                ),
        );
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let dest = dir.path().join("a.txt");

        let outcome = downloader
            .download(&object("a", "a.txt"), &dest, &NoopReporter, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.bytes_written, 6);
        assert_eq!(std::fs::read(&dest).unwrap(), b"abcdef");
        // Two failures, then two successful chunks.
        assert_eq!(store.chunk_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FakeStore::new()
                .with_file("a", "a.txt", None, "abcdef")
                .fail_chunks("a", vec![RemotePortError::RateLimited; 4]),
        );
        let downloader = ChunkedDownloader::new(store.clone(), config());

        let err = downloader
            .download(
                &object("a", "a.txt"),
                &dir.path().join("a.txt"),
                &NoopReporter,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Remote { ref message } if message.contains("4 attempts")));
        assert_eq!(store.chunk_calls(), 4);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FakeStore::new()
                .with_file("a", "a.txt", None, "abcdef")
                .fail_chunks(
                    "a",
                    vec![RemotePortError::AuthRequired {
                        message: "expired".to_string(),
                    }],
                ),
        );
        let downloader = ChunkedDownloader::new(store.clone(), config());

        let err = downloader
            .download(
                &object("a", "a.txt"),
                &dir.path().join("a.txt"),
                &NoopReporter,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Remote { ref message } if message.contains("expired")));
        assert_eq!(store.chunk_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_chunk_times_out() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FakeStore::new()
                .with_file("a", "a.txt", None, "abcdef")
                .hang_chunks("a"),
        );
        let downloader = ChunkedDownloader::new(
            store.clone(),
            TransferConfig {
                max_chunk_retries: 1,
                ..config()
            },
        );

        let err = downloader
            .download(
                &object("a", "a.txt"),
                &dir.path().join("a.txt"),
                &NoopReporter,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Remote { ref message } if message.contains("timed out")));
        assert_eq!(store.chunk_calls(), 2);
    }

    #[tokio::test]
    async fn test_document_falls_back_to_export() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FakeStore::new().with_document("d", "Notes.txt", None, "exported"));
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let doc = RemoteObject::new("d", "Notes.txt", ObjectKind::Document)
            .with_mime_type("application/vnd.google-apps.document");

        let outcome = downloader
            .download(&doc, &dir.path().join("Notes.txt"), &NoopReporter, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.fallback_used);
        assert_eq!(outcome.final_path, dir.path().join("Notes.docx"));
        assert_eq!(std::fs::read(&outcome.final_path).unwrap(), b"exported");
        assert!(!dir.path().join("Notes.txt").exists());
        assert_eq!(store.export_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_export_rejects_transfer() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FakeStore::new()
                .with_document("d", "Notes", None, "exported")
                .fail_export("d"),
        );
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let doc = RemoteObject::new("d", "Notes", ObjectKind::Document);

        let err = downloader
            .download(&doc, &dir.path().join("Notes"), &NoopReporter, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::TransferRejected { ref name, .. } if name == "Notes"));
        assert_eq!(store.export_calls(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_between_chunks() {
        let dir = tempdir().unwrap();
        let token = CancellationToken::new();
        let store = Arc::new(
            FakeStore::new()
                .with_file("a", "a.txt", None, "0123456789")
                .cancel_after_chunks("a", 1, token.clone()),
        );
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let recorder = Recorder::default();

        let err = downloader
            .download(&object("a", "a.txt"), &dir.path().join("a.txt"), &recorder, &token)
            .await
            .unwrap_err();

        assert_eq!(err, DownloadError::Interrupted { bytes_written: 4 });
        assert_eq!(store.chunk_calls(), 1);
        assert_eq!(recorder.events().last().unwrap(), "finish a.txt false");
    }

    #[tokio::test]
    async fn test_cancelled_before_start_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FakeStore::new().with_file("a", "a.txt", None, "0123456789"));
        let downloader = ChunkedDownloader::new(store.clone(), config());
        let token = CancellationToken::new();
        token.cancel();
        let dest = dir.path().join("a.txt");

        let err = downloader
            .download(&object("a", "a.txt"), &dest, &NoopReporter, &token)
            .await
            .unwrap_err();

        assert!(err.is_interrupted());
        assert!(!dest.exists());
        assert_eq!(store.chunk_calls(), 0);
    }

    #[test]
    fn test_export_path() {
        let dir = Path::new("/out");
        assert_eq!(
            export_path(&dir.join("Notes.txt"), ExportFormat::Docx),
            dir.join("Notes.docx")
        );
        assert_eq!(
            export_path(&dir.join("Budget"), ExportFormat::Xlsx),
            dir.join("Budget.xlsx")
        );
        assert_eq!(
            export_path(&dir.join("Dr. Strangelove notes"), ExportFormat::Pdf),
            dir.join("Dr. Strangelove notes.pdf")
        );
    }
}
