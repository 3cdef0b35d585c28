//! Download job descriptions.
//!
//! A `DownloadJob` is built once from configuration, consumed once by the
//! orchestrator and never persisted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The four ways a job can turn names into files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    /// Each name is a single file.
    SingleFileSet,
    /// Each name is a folder whose direct children are downloaded.
    FlatFolderSet,
    /// The first name is a folder whose sub-folders form a flat folder set.
    NestedFolderTree,
    /// Each name is a search term; the catalog turns it into folder names.
    DerivedFolderSet {
        /// Catalog field the term is matched against (e.g. "director").
        field: String,
    },
}

impl JobKind {
    /// Short label used in logs and summaries.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SingleFileSet => "files",
            Self::FlatFolderSet => "folders",
            Self::NestedFolderTree => "tree",
            Self::DerivedFolderSet { .. } => "derived",
        }
    }
}

/// A batch of names to download into one target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadJob {
    /// How names are interpreted.
    pub kind: JobKind,
    /// Names in processing order.
    pub names: Vec<String>,
    /// Root directory for everything this job writes.
    pub target_dir: PathBuf,
    /// Place each file in a sub-folder named after the file (without extension).
    pub per_item_subfolder: bool,
    /// Optional parent folder id used to disambiguate file names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl DownloadJob {
    /// Create a job with default options.
    pub fn new(kind: JobKind, names: Vec<String>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            names,
            target_dir: target_dir.into(),
            per_item_subfolder: false,
            parent_id: None,
        }
    }

    #[must_use]
    pub const fn with_per_item_subfolder(mut self, enabled: bool) -> Self {
        self.per_item_subfolder = enabled;
        self
    }

    #[must_use]
    pub fn with_parent_id(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }
}
