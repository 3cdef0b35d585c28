//! Core domain types and port definitions for driveloader.
//!
//! This crate knows nothing about HTTP or terminals. Adapters implement the
//! traits in [`ports`]; the download engine consumes them.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod download;
pub mod instructions;
pub mod ports;
pub mod settings;
pub mod utils;

pub use config::{ConfigError, load_jobs};
pub use domain::{
    ExportFormat, FOLDER_MIME_TYPE, KindFilter, NATIVE_MIME_PREFIX, NameMatch, ObjectKind,
    ObjectQuery, RemoteObject, escape_query_value,
};
pub use download::{
    BatchReport, DownloadError, DownloadJob, DownloadResult, GroupFailure, ItemOutcome, ItemReport,
    JobKind, TransferOutcome,
};
pub use instructions::{
    Instruction, InstructionError, JobMethod, load_instructions, parse_instructions,
    resolve_target,
};
pub use ports::{
    CandidateCatalog, CatalogError, EmptyCatalog, MediaChunk, RemotePortError, RemotePortResult,
    RemoteStorePort,
};
pub use settings::{LedgerMatch, Settings, SettingsError, validate_settings};
pub use utils::{format_hms, format_size, format_speed};
