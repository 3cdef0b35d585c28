//! Remote store port trait.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::RemotePortResult;
use super::types::MediaChunk;
use crate::domain::{ObjectQuery, RemoteObject};

/// Port trait for the remote hierarchical object store.
///
/// This trait defines the interface that the download core uses to talk to
/// the store. The Drive implementation lives in `driveloader-drive`.
///
/// # Design
///
/// - Uses core-owned DTOs, not Drive API types
/// - Returns `RemotePortError` for all failures
/// - Listing results are fresh snapshots; implementations must not cache them
#[async_trait]
pub trait RemoteStorePort: Send + Sync {
    /// List every object matching `query`, following pagination.
    async fn list(&self, query: &ObjectQuery) -> RemotePortResult<Vec<RemoteObject>>;

    /// Fetch the declared size of one object.
    ///
    /// Returns `None` for objects without binary content (documents).
    async fn object_size(&self, id: &str) -> RemotePortResult<Option<u64>>;

    /// Read `len` bytes of binary content starting at `offset`.
    ///
    /// Document-kind objects fail with `RemotePortError::NotDownloadable`.
    async fn fetch_chunk(&self, id: &str, offset: u64, len: u64) -> RemotePortResult<MediaChunk>;

    /// Export a document-kind object to `mime_type`.
    async fn export(&self, id: &str, mime_type: &str) -> RemotePortResult<Bytes>;
}
