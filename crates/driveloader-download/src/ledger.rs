//! Per-directory completion ledger.
//!
//! A plain-text file (default `success.txt`) inside each target directory,
//! one filename per line, appended after a confirmed transfer and never
//! rewritten. There is exactly one writer per directory at a time: the
//! orchestrator, which processes items sequentially.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use driveloader_core::download::{DownloadError, DownloadResult};
use driveloader_core::settings::LedgerMatch;

/// Completion record for one directory.
#[derive(Debug, Clone)]
pub struct CompletionLedger {
    path: PathBuf,
    mode: LedgerMatch,
}

impl CompletionLedger {
    /// Ledger stored as `dir/file_name`. Nothing is created until the first
    /// `mark_complete`.
    pub fn for_dir(dir: &Path, file_name: &str, mode: LedgerMatch) -> Self {
        Self {
            path: dir.join(file_name),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `filename` was recorded as complete, using the configured
    /// match mode.
    pub fn is_complete(&self, filename: &str) -> DownloadResult<bool> {
        self.lookup(filename, self.mode)
    }

    /// Whether `filename` has a line of its own, whatever the match mode.
    ///
    /// Used before deleting a partial file: a substring hit on a longer name
    /// must not protect it.
    pub fn has_exact_entry(&self, filename: &str) -> DownloadResult<bool> {
        self.lookup(filename, LedgerMatch::Exact)
    }

    fn lookup(&self, filename: &str, mode: LedgerMatch) -> DownloadResult<bool> {
        let record = match std::fs::read_to_string(&self.path) {
            Ok(record) => record,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(DownloadError::from_io_error(&e)),
        };

        Ok(match mode {
            LedgerMatch::Exact => record.lines().any(|line| line.trim_end() == filename),
            LedgerMatch::Substring => record.contains(filename),
        })
    }

    /// Append `filename` to the record, creating it on first use.
    pub fn mark_complete(&self, filename: &str) -> DownloadResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{filename}")?;
        file.sync_data()?;
        tracing::debug!(ledger = %self.path.display(), name = filename, "Marked complete");
        Ok(())
    }

    /// Every recorded filename, in the order they were appended.
    pub fn entries(&self) -> DownloadResult<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(record) => Ok(record
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(DownloadError::from_io_error(&e)),
        }
    }
}
