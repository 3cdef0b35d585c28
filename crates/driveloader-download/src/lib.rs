//! Download engine for driveloader.
//!
//! Resolves names against a [`RemoteStorePort`](driveloader_core::ports::RemoteStorePort),
//! expands folders, transfers content in chunks and records completions in a
//! per-directory ledger. [`DownloadOrchestrator`] ties it together for the
//! four job kinds.
//!
//! - `resolver` - name to object resolution with an ambiguity policy
//! - `expander` - folder lookup and listing
//! - `ledger` - completion ledger
//! - `transfer` - chunked downloader with export fallback
//! - `orchestrator` - job dispatch and batch reports
//! - `catalog` - JSON film catalog for derived folder sets
//! - `testing` - in-memory store for tests (`test-utils` feature)

// Test builds also see the crate itself as a dev-dependency (for the
// `test-utils` feature), which the lint would flag.
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

// Only referenced by the `testing` module.
#[cfg(not(any(test, feature = "test-utils")))]
use async_trait as _;
#[cfg(not(any(test, feature = "test-utils")))]
use bytes as _;

mod catalog;
mod expander;
mod ledger;
mod orchestrator;
mod progress;
mod resolver;
mod transfer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use catalog::{FilmEntry, JsonFilmCatalog};
pub use expander::{Disambiguator, FirstMatch, FolderExpander, FolderRef};
pub use ledger::CompletionLedger;
pub use orchestrator::{DownloadOrchestrator, OrchestratorOptions};
pub use progress::{NoopReporter, ProgressReporter, ProgressThrottle, TransferProgress};
pub use resolver::{AmbiguityPolicy, NameResolver};
pub use transfer::{ChunkedDownloader, TransferConfig, export_path};
