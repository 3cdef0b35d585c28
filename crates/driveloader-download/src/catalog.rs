//! JSON film catalog for derived folder sets.
//!
//! The catalog file is an array of films:
//!
//! ```json
//! [
//!   { "director": "Abbas Kiarostami", "year": 1990, "title": "Close-Up" },
//!   { "director": "Abbas Kiarostami", "year": 1997, "title": "Taste of Cherry",
//!     "titles": ["Ta'm e guilass"] }
//! ]
//! ```
//!
//! Each film title doubles as the name of the folder holding it.

use std::path::Path;

use serde::Deserialize;

use driveloader_core::ports::{CandidateCatalog, CatalogError};

const DIRECTOR_FIELD: &str = "director";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilmEntry {
    pub director: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    /// Alternate titles, tried after `title`.
    #[serde(default)]
    pub titles: Vec<String>,
}

impl FilmEntry {
    fn folder_names(&self) -> impl Iterator<Item = &str> {
        self.title
            .iter()
            .chain(self.titles.iter())
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }
}

/// `CandidateCatalog` backed by a JSON film list.
#[derive(Debug, Clone, Default)]
pub struct JsonFilmCatalog {
    films: Vec<FilmEntry>,
}

impl JsonFilmCatalog {
    pub fn new(films: Vec<FilmEntry>) -> Self {
        Self { films }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Unavailable {
            message: format!("{}: {e}", path.display()),
        })?;
        let catalog = Self::from_json(&raw).map_err(|e| match e {
            CatalogError::Unavailable { message } => CatalogError::Unavailable {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), films = catalog.len(), "Loaded film catalog");
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let films: Vec<FilmEntry> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Unavailable {
                message: e.to_string(),
            })?;
        Ok(Self::new(films))
    }

    pub fn len(&self) -> usize {
        self.films.len()
    }

    pub fn is_empty(&self) -> bool {
        self.films.is_empty()
    }
}

impl CandidateCatalog for JsonFilmCatalog {
    /// Titles by directors whose name contains `term`, oldest first.
    /// Films without a year sort last.
    fn lookup(&self, field: &str, term: &str) -> Result<Vec<String>, CatalogError> {
        if !field.eq_ignore_ascii_case(DIRECTOR_FIELD) {
            return Err(CatalogError::UnsupportedField {
                field: field.to_string(),
            });
        }

        let mut films: Vec<&FilmEntry> = self
            .films
            .iter()
            .filter(|f| f.director.contains(term))
            .collect();
        films.sort_by_key(|f| (f.year.is_none(), f.year));

        let mut names: Vec<String> = Vec::new();
        for name in films.iter().flat_map(|f| f.folder_names()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}
