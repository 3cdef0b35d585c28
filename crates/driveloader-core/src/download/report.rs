//! Per-item outcomes and batch summaries.
//!
//! Every item ends up as one `ItemReport` holding a `Result`, so a failure in
//! one item never unwinds past the item boundary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;

/// Result of one transfer attempt by the chunked downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    /// True when the chunk loop reported completion or the export finished.
    pub success: bool,
    /// Bytes written to the destination file.
    pub bytes_written: u64,
    /// True when the export path produced the file.
    pub fallback_used: bool,
    /// Where the bytes ended up (extension differs when the fallback ran).
    pub final_path: PathBuf,
}

/// What happened to an item that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Bytes were transferred.
    Transferred(TransferOutcome),
    /// The ledger already recorded this item; nothing was transferred.
    AlreadyComplete,
}

/// Outcome of one item in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Name as supplied (or as listed inside a folder).
    pub name: String,
    /// Directory the item was destined for.
    pub directory: PathBuf,
    /// Success or the error that stopped this item.
    pub result: Result<ItemOutcome, DownloadError>,
}

impl ItemReport {
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        result: Result<ItemOutcome, DownloadError>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            result,
        }
    }

    pub const fn is_transferred(&self) -> bool {
        matches!(self.result, Ok(ItemOutcome::Transferred(_)))
    }

    pub const fn is_already_complete(&self) -> bool {
        matches!(self.result, Ok(ItemOutcome::AlreadyComplete))
    }

    pub const fn is_failed(&self) -> bool {
        self.result.is_err()
    }

    /// The transfer outcome, if bytes were moved.
    pub const fn outcome(&self) -> Option<&TransferOutcome> {
        match &self.result {
            Ok(ItemOutcome::Transferred(outcome)) => Some(outcome),
            _ => None,
        }
    }
}

/// A folder (or search term) that could not be turned into items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    /// Folder name or search term.
    pub name: String,
    /// Why it was skipped.
    pub error: DownloadError,
}

/// Everything a job did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One entry per file the job attempted or skipped.
    pub items: Vec<ItemReport>,
    /// Folders or search terms skipped before any item was attempted.
    pub group_failures: Vec<GroupFailure>,
    /// Search terms that mapped to no candidate folders.
    pub empty_lookups: Vec<String>,
    /// True if the batch stopped early because of cancellation.
    pub interrupted: bool,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_item(&mut self, item: ItemReport) {
        self.items.push(item);
    }

    pub fn push_group_failure(&mut self, name: impl Into<String>, error: DownloadError) {
        self.group_failures.push(GroupFailure {
            name: name.into(),
            error,
        });
    }

    /// Fold another report into this one, keeping order.
    pub fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
        self.group_failures.extend(other.group_failures);
        self.empty_lookups.extend(other.empty_lookups);
        self.interrupted |= other.interrupted;
    }

    pub fn transferred(&self) -> usize {
        self.items.iter().filter(|i| i.is_transferred()).count()
    }

    pub fn already_complete(&self) -> usize {
        self.items.iter().filter(|i| i.is_already_complete()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| i.is_failed()).count()
    }

    /// Number of transfers that went through the export fallback.
    pub fn exported(&self) -> usize {
        self.items
            .iter()
            .filter_map(ItemReport::outcome)
            .filter(|o| o.fallback_used)
            .count()
    }

    pub fn bytes_written(&self) -> u64 {
        self.items
            .iter()
            .filter_map(ItemReport::outcome)
            .map(|o| o.bytes_written)
            .sum()
    }
}
