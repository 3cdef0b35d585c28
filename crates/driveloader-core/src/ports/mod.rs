//! Port definitions (trait abstractions).
//!
//! Ports are implemented by adapters (`driveloader-drive`) or by the download
//! crate itself; the core never depends on a concrete implementation.

pub mod catalog;
pub mod remote_store;

pub use catalog::{CandidateCatalog, CatalogError, EmptyCatalog};
pub use remote_store::{MediaChunk, RemotePortError, RemotePortResult, RemoteStorePort};
