//! Remote store port definitions.
//!
//! This module defines the port trait and DTOs for talking to the remote
//! object store. The actual implementation lives in `driveloader-drive`.

mod client;
mod error;
mod types;

pub use client::RemoteStorePort;
pub use error::{RemotePortError, RemotePortResult};
pub use types::MediaChunk;
