//! Settings domain types and validation.
//!
//! Settings are read from a JSON file. Every field is optional; the
//! `effective_*` accessors supply defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::ExportFormat;

/// Default chunk size for ranged reads, in MiB.
pub const DEFAULT_CHUNK_SIZE_MIB: u64 = 10;

/// Default per-chunk timeout in seconds.
pub const DEFAULT_CHUNK_TIMEOUT_SECS: u64 = 120;

/// Default number of retries for one chunk.
pub const DEFAULT_MAX_CHUNK_RETRIES: u8 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Default name of the per-directory completion ledger.
pub const DEFAULT_LEDGER_FILE: &str = "success.txt";

const MAX_CHUNK_SIZE_MIB: u64 = 1024;

/// How the completion ledger matches a filename against its record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerMatch {
    /// A line must equal the filename.
    #[default]
    Exact,
    /// The filename may appear anywhere in the record. Kept for ledgers
    /// written by older versions; prefixes of other names match too.
    Substring,
}

impl fmt::Display for LedgerMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Substring => f.write_str("substring"),
        }
    }
}

impl FromStr for LedgerMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "substring" => Ok(Self::Substring),
            other => Err(format!("unknown ledger match mode '{other}'")),
        }
    }
}

/// Application settings structure.
///
/// All fields are optional to support partial files and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root directory substituted for `.` and relative job targets.
    pub base_target: Option<PathBuf>,

    /// Size of each ranged read, in MiB.
    pub chunk_size_mib: Option<u64>,

    /// Timeout for a single chunk request, in seconds.
    pub chunk_timeout_secs: Option<u64>,

    /// Retries for one chunk before the item fails.
    pub max_chunk_retries: Option<u8>,

    /// Base delay for exponential backoff between retries.
    pub retry_base_delay_ms: Option<u64>,

    /// Return the first match instead of failing on ambiguous names.
    pub best_effort_resolution: Option<bool>,

    /// Ledger matching mode.
    pub ledger_match: Option<LedgerMatch>,

    /// Ledger file name inside each target directory.
    pub ledger_file: Option<String>,

    /// JSON film catalog used by derived folder sets.
    pub catalog_file: Option<PathBuf>,

    /// Default export format for documents.
    pub export_format: Option<ExportFormat>,

    /// Ask on the terminal when a folder name matches several folders.
    pub interactive: Option<bool>,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        validate_settings(&settings)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Load settings if the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Chunk size in bytes.
    pub fn effective_chunk_size(&self) -> u64 {
        self.chunk_size_mib
            .unwrap_or(DEFAULT_CHUNK_SIZE_MIB)
            .clamp(1, MAX_CHUNK_SIZE_MIB)
            * 1024
            * 1024
    }

    pub fn effective_chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_secs.unwrap_or(DEFAULT_CHUNK_TIMEOUT_SECS))
    }

    pub fn effective_max_chunk_retries(&self) -> u8 {
        self.max_chunk_retries.unwrap_or(DEFAULT_MAX_CHUNK_RETRIES)
    }

    pub fn effective_retry_base_delay(&self) -> Duration {
        Duration::from_millis(
            self.retry_base_delay_ms
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
        )
    }

    pub fn effective_best_effort(&self) -> bool {
        self.best_effort_resolution.unwrap_or(false)
    }

    pub fn effective_ledger_match(&self) -> LedgerMatch {
        self.ledger_match.unwrap_or_default()
    }

    pub fn effective_ledger_file(&self) -> &str {
        self.ledger_file.as_deref().unwrap_or(DEFAULT_LEDGER_FILE)
    }

    pub fn effective_export_format(&self) -> ExportFormat {
        self.export_format.unwrap_or_default()
    }

    pub fn effective_interactive(&self) -> bool {
        self.interactive.unwrap_or(true)
    }

    /// Base directory for job targets, falling back to `fallback`.
    pub fn effective_base_target(&self, fallback: &Path) -> PathBuf {
        self.base_target
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse settings file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Chunk size must be between 1 and 1024 MiB, got {0}")]
    InvalidChunkSize(u64),

    #[error("Chunk timeout must be at least one second")]
    InvalidChunkTimeout,

    #[error("Ledger file name must be a plain file name, got '{0}'")]
    InvalidLedgerFile(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(size) = settings.chunk_size_mib {
        if size == 0 || size > MAX_CHUNK_SIZE_MIB {
            return Err(SettingsError::InvalidChunkSize(size));
        }
    }

    if settings.chunk_timeout_secs == Some(0) {
        return Err(SettingsError::InvalidChunkTimeout);
    }

    if let Some(ref name) = settings.ledger_file {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SettingsError::InvalidLedgerFile(name.clone()));
        }
    }

    Ok(())
}
