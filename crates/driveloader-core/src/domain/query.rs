//! Typed listing queries and their rendering into the store query language.
//!
//! Queries are plain strings of clauses joined with ` and `. Any value that
//! came from a user (names, ids) is quote-escaped before being embedded.

use std::fmt;

use super::object::FOLDER_MIME_TYPE;

/// How a name clause matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// `name = '<value>'`
    Exact,
    /// `name contains '<value>'` (partial names are valid input)
    Contains,
}

/// Restrict results by object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    /// Only folders.
    Folder,
    /// Everything except folders.
    NotFolder,
}

/// A listing query against the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectQuery {
    name: Option<(NameMatch, String)>,
    parent_id: Option<String>,
    kind: Option<KindFilter>,
    include_trashed: bool,
}

impl ObjectQuery {
    /// An empty query (matches every non-trashed object).
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects whose name contains `name`.
    pub fn name_contains(name: impl Into<String>) -> Self {
        Self::new().with_name(NameMatch::Contains, name)
    }

    /// Direct children of `parent_id`.
    pub fn children_of(parent_id: impl Into<String>) -> Self {
        Self::new().with_parent(parent_id)
    }

    #[must_use]
    pub fn with_name(mut self, mode: NameMatch, name: impl Into<String>) -> Self {
        self.name = Some((mode, name.into()));
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KindFilter) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub const fn including_trashed(mut self) -> Self {
        self.include_trashed = true;
        self
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn name(&self) -> Option<(NameMatch, &str)> {
        self.name.as_ref().map(|(mode, name)| (*mode, name.as_str()))
    }

    pub const fn kind(&self) -> Option<KindFilter> {
        self.kind
    }

    pub const fn includes_trashed(&self) -> bool {
        self.include_trashed
    }

    /// Render the query string sent to the store.
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::with_capacity(4);

        if let Some((mode, name)) = &self.name {
            let op = match mode {
                NameMatch::Exact => "=",
                NameMatch::Contains => "contains",
            };
            clauses.push(format!("name {op} '{}'", escape_query_value(name)));
        }
        if let Some(parent) = &self.parent_id {
            clauses.push(format!("'{}' in parents", escape_query_value(parent)));
        }
        match self.kind {
            Some(KindFilter::Folder) => clauses.push(format!("mimeType = '{FOLDER_MIME_TYPE}'")),
            Some(KindFilter::NotFolder) => {
                clauses.push(format!("mimeType != '{FOLDER_MIME_TYPE}'"));
            }
            None => {}
        }
        if !self.include_trashed {
            clauses.push("trashed = false".to_string());
        }

        clauses.join(" and ")
    }
}

impl fmt::Display for ObjectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Escape a value for embedding inside a single-quoted query literal.
///
/// Backslashes are escaped first so the quote escapes are not doubled.
pub fn escape_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quotes_and_backslashes() {
        assert_eq!(escape_query_value("Kiarostami"), "Kiarostami");
        assert_eq!(escape_query_value("L'Avventura"), "L\\'Avventura");
        assert_eq!(escape_query_value("a\\b"), "a\\\\b");
        assert_eq!(escape_query_value("\\'"), "\\\\\\'");
    }

    #[test]
    fn test_name_contains_query() {
        let q = ObjectQuery::name_contains("Close-Up");
        assert_eq!(q.to_query_string(), "name contains 'Close-Up' and trashed = false");
    }

    #[test]
    fn test_name_with_parent_query() {
        let q = ObjectQuery::name_contains("Taste of Cherry").with_parent("folder'1");
        assert_eq!(
            q.to_query_string(),
            "name contains 'Taste of Cherry' and 'folder\\'1' in parents and trashed = false"
        );
    }

    #[test]
    fn test_folder_kind_query() {
        let q = ObjectQuery::new()
            .with_name(NameMatch::Exact, "Trip Photos")
            .with_kind(KindFilter::Folder)
            .including_trashed();
        assert_eq!(
            q.to_query_string(),
            "name = 'Trip Photos' and mimeType = 'application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn test_children_query() {
        let q = ObjectQuery::children_of("xyz").with_kind(KindFilter::NotFolder);
        assert_eq!(
            q.to_string(),
            "'xyz' in parents and mimeType != 'application/vnd.google-apps.folder' and trashed = false"
        );
    }

    #[test]
    fn test_injection_attempt_stays_inside_literal() {
        let q = ObjectQuery::name_contains("x' or name contains '");
        assert_eq!(
            q.to_query_string(),
            "name contains 'x\\' or name contains \\'' and trashed = false"
        );
    }
}
