//! Candidate catalog port.
//!
//! Derived folder sets need an external mapping from a search term (such as
//! a director's name) to the folder names that should be downloaded.

use thiserror::Error;

/// Errors from a candidate lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog cannot search by this field.
    #[error("Catalog cannot be searched by '{field}'")]
    UnsupportedField {
        /// The requested field
        field: String,
    },

    /// The catalog could not be loaded.
    #[error("Catalog unavailable: {message}")]
    Unavailable {
        /// What went wrong
        message: String,
    },
}

/// Maps a search term to candidate folder names.
pub trait CandidateCatalog: Send + Sync {
    /// Look up folder names for `term` in `field`, in the order they should
    /// be processed. An empty result is not an error.
    fn lookup(&self, field: &str, term: &str) -> Result<Vec<String>, CatalogError>;
}

/// Catalog that never has candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl CandidateCatalog for EmptyCatalog {
    fn lookup(&self, _field: &str, _term: &str) -> Result<Vec<String>, CatalogError> {
        Ok(Vec::new())
    }
}
