//! In-memory remote store.
//!
//! `FakeStore` implements `RemoteStorePort` over a fixed set of objects so the
//! engine can be exercised without a network. Listing honours the name,
//! parent and kind clauses of an `ObjectQuery`; content is served in ranges
//! like the real store. Failures, rejections and cancellation can be
//! injected per object.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use driveloader_core::domain::{KindFilter, NameMatch, ObjectKind, ObjectQuery, RemoteObject};
use driveloader_core::ports::{MediaChunk, RemotePortError, RemotePortResult, RemoteStorePort};

const GOOGLE_DOC: &str = "application/vnd.google-apps.document";

#[derive(Default)]
struct State {
    objects: Vec<RemoteObject>,
    contents: HashMap<String, Bytes>,
    exports: HashMap<String, Bytes>,
    chunk_failures: HashMap<String, (usize, VecDeque<RemotePortError>)>,
    failing_exports: HashSet<String>,
    hanging: HashMap<String, usize>,
    cancel_after: HashMap<String, (usize, CancellationToken)>,
    served_chunks: HashMap<String, usize>,
    list_calls: usize,
    chunk_calls: usize,
    export_calls: usize,
}

/// In-memory `RemoteStorePort`.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, object: RemoteObject) -> Self {
        self.lock().objects.push(object);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking test thread poisons the lock; the data is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a binary file with `content`.
    #[must_use]
    pub fn with_file(
        self,
        id: &str,
        name: &str,
        parent: Option<&str>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        let mut object =
            RemoteObject::new(id, name, ObjectKind::File).with_size(content.len() as u64);
        if let Some(parent) = parent {
            object = object.with_parent(parent);
        }
        self.lock().contents.insert(id.to_string(), content);
        self.push(object)
    }

    /// Add a folder.
    #[must_use]
    pub fn with_folder(self, id: &str, name: &str, parent: Option<&str>) -> Self {
        let mut object = RemoteObject::new(id, name, ObjectKind::Folder)
            .with_mime_type(driveloader_core::domain::FOLDER_MIME_TYPE);
        if let Some(parent) = parent {
            object = object.with_parent(parent);
        }
        self.push(object)
    }

    /// Add a document that refuses raw download and exports to `exported`.
    #[must_use]
    pub fn with_document(
        self,
        id: &str,
        name: &str,
        parent: Option<&str>,
        exported: impl Into<Bytes>,
    ) -> Self {
        let mut object = RemoteObject::new(id, name, ObjectKind::Document).with_mime_type(GOOGLE_DOC);
        if let Some(parent) = parent {
            object = object.with_parent(parent);
        }
        self.lock().exports.insert(id.to_string(), exported.into());
        self.push(object)
    }

    /// Make the next `fetch_chunk` calls for `id` fail with `errors`, in order.
    #[must_use]
    pub fn fail_chunks(self, id: &str, errors: Vec<RemotePortError>) -> Self {
        self.fail_chunks_after(id, 0, errors)
    }

    /// Serve `served` chunks of `id`, then fail the following calls with
    /// `errors`, in order.
    #[must_use]
    pub fn fail_chunks_after(self, id: &str, served: usize, errors: Vec<RemotePortError>) -> Self {
        self.lock()
            .chunk_failures
            .insert(id.to_string(), (served, errors.into()));
        self
    }

    /// Make exports of `id` fail.
    #[must_use]
    pub fn fail_export(self, id: &str) -> Self {
        self.lock().failing_exports.insert(id.to_string());
        self
    }

    /// Make `fetch_chunk` for `id` never return.
    #[must_use]
    pub fn hang_chunks(self, id: &str) -> Self {
        self.hang_chunks_after(id, 0)
    }

    /// Serve `served` chunks of `id`, then never return.
    #[must_use]
    pub fn hang_chunks_after(self, id: &str, served: usize) -> Self {
        self.lock().hanging.insert(id.to_string(), served);
        self
    }

    /// Cancel `token` once `chunks` chunks of `id` have been served.
    #[must_use]
    pub fn cancel_after_chunks(self, id: &str, chunks: usize, token: CancellationToken) -> Self {
        self.lock()
            .cancel_after
            .insert(id.to_string(), (chunks, token));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn chunk_calls(&self) -> usize {
        self.lock().chunk_calls
    }

    pub fn export_calls(&self) -> usize {
        self.lock().export_calls
    }

    fn matches(query: &ObjectQuery, object: &RemoteObject) -> bool {
        let name_ok = match query.name() {
            Some((NameMatch::Exact, name)) => object.name == name,
            Some((NameMatch::Contains, name)) => object.name.contains(name),
            None => true,
        };
        let parent_ok = query
            .parent_id()
            .is_none_or(|parent| object.parent_id.as_deref() == Some(parent));
        let kind_ok = match query.kind() {
            Some(KindFilter::Folder) => object.is_folder(),
            Some(KindFilter::NotFolder) => !object.is_folder(),
            None => true,
        };
        name_ok && parent_ok && kind_ok
    }

    fn find(&self, id: &str) -> RemotePortResult<RemoteObject> {
        self.lock()
            .objects
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| RemotePortError::NotFound { id: id.to_string() })
    }
}

#[async_trait]
impl RemoteStorePort for FakeStore {
    async fn list(&self, query: &ObjectQuery) -> RemotePortResult<Vec<RemoteObject>> {
        let mut state = self.lock();
        state.list_calls += 1;
        Ok(state
            .objects
            .iter()
            .filter(|o| Self::matches(query, o))
            .cloned()
            .collect())
    }

    async fn object_size(&self, id: &str) -> RemotePortResult<Option<u64>> {
        Ok(self.find(id)?.size)
    }

    async fn fetch_chunk(&self, id: &str, offset: u64, len: u64) -> RemotePortResult<MediaChunk> {
        let object = self.find(id)?;
        let hang = {
            let mut state = self.lock();
            state.chunk_calls += 1;
            let served = state.served_chunks.get(id).copied().unwrap_or(0);
            if let Some((after, errors)) = state.chunk_failures.get_mut(id) {
                if served >= *after {
                    if let Some(err) = errors.pop_front() {
                        return Err(err);
                    }
                }
            }
            state.hanging.get(id).is_some_and(|&after| served >= after)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if object.kind != ObjectKind::File {
            return Err(RemotePortError::NotDownloadable { id: id.to_string() });
        }

        let mut state = self.lock();
        let content = state.contents.get(id).cloned().unwrap_or_default();
        let total = content.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(total);
        let end = start
            .saturating_add(usize::try_from(len).unwrap_or(usize::MAX))
            .min(total);
        let chunk = MediaChunk::new(content.slice(start..end), Some(total as u64));

        let served = state.served_chunks.entry(id.to_string()).or_insert(0);
        *served += 1;
        let served = *served;
        if let Some((after, token)) = state.cancel_after.get(id) {
            if served >= *after {
                token.cancel();
            }
        }
        Ok(chunk)
    }

    async fn export(&self, id: &str, _mime_type: &str) -> RemotePortResult<Bytes> {
        let object = self.find(id)?;
        let mut state = self.lock();
        state.export_calls += 1;
        if state.failing_exports.contains(id) {
            return Err(RemotePortError::Network {
                message: format!("export of {} failed", object.name),
            });
        }
        state
            .exports
            .get(id)
            .cloned()
            .ok_or_else(|| RemotePortError::NotDownloadable { id: id.to_string() })
    }
}
