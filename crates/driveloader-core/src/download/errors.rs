//! Download error types.
//!
//! These errors are designed to be serializable and cloneable so they can be
//! stored inside batch reports. For I/O errors, we capture the kind and
//! message as strings instead of holding `std::io::Error`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::RemotePortError;

/// Error type for resolution, expansion and transfer of a single item.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// No object matched a resolution query.
    #[error("No object named '{name}' was found")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// More than one object matched and nothing narrowed it down.
    #[error("'{name}' is ambiguous: {count} objects match")]
    Ambiguous {
        /// The name that was looked up.
        name: String,
        /// How many objects matched.
        count: usize,
    },

    /// A folder listing returned no children.
    #[error("Folder '{folder}' is empty")]
    EmptyFolder {
        /// Folder name or id that was listed.
        folder: String,
    },

    /// The store refused a direct download (document kind) and the export
    /// fallback failed as well.
    #[error("Transfer of '{name}' was rejected: {message}")]
    TransferRejected {
        /// Name of the rejected object.
        name: String,
        /// Why the export fallback failed.
        message: String,
    },

    /// The batch was cancelled while this item was in flight.
    #[error("Download interrupted after {bytes_written} bytes")]
    Interrupted {
        /// Bytes written to disk before the interruption.
        bytes_written: u64,
    },

    /// Remote store error (network, auth, bad response).
    #[error("Remote store error: {message}")]
    Remote {
        /// Detailed error message.
        message: String,
    },

    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "`NotFound`", "`PermissionDenied`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Candidate lookup failed for a derived folder set.
    #[error("Catalog lookup failed: {message}")]
    Catalog {
        /// Detailed error message.
        message: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl DownloadError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn ambiguous(name: impl Into<String>, count: usize) -> Self {
        Self::Ambiguous {
            name: name.into(),
            count,
        }
    }

    pub fn empty_folder(folder: impl Into<String>) -> Self {
        Self::EmptyFolder {
            folder: folder.into(),
        }
    }

    pub fn transfer_rejected(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransferRejected {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error stops the whole batch rather than one item.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    /// Whether this error comes from resolving a name (as opposed to moving bytes).
    #[must_use]
    pub const fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Ambiguous { .. } | Self::EmptyFolder { .. }
        )
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io_error(&err)
    }
}

impl From<RemotePortError> for DownloadError {
    fn from(err: RemotePortError) -> Self {
        Self::remote(err.to_string())
    }
}

/// Convenience result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;
