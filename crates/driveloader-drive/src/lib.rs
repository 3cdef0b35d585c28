//! Google Drive v3 adapter for driveloader.
//!
//! [`DefaultDriveClient`] implements `RemoteStorePort` from `driveloader-core`
//! over the Drive REST API. Everything else in this crate is internal.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultDriveClient is used through RemoteStorePort, not its generic structure
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

pub use client::DefaultDriveClient;
pub use config::DriveClientConfig;
