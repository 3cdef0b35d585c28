//! Remote object snapshots.
//!
//! A `RemoteObject` is what a single listing call returned for one entry.
//! It is never cached across resolution calls: names are not unique and a
//! stale snapshot could silently point at the wrong object.

use serde::{Deserialize, Serialize};

/// MIME type the store uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by all store-native (non-binary) document types.
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// What kind of object a remote entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Binary content that can be downloaded directly.
    File,
    /// A container of other objects.
    Folder,
    /// A store-native document that must be exported before download.
    Document,
}

impl ObjectKind {
    /// Classify an object from its MIME type.
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            Self::Folder
        } else if mime_type.starts_with(NATIVE_MIME_PREFIX) {
            Self::Document
        } else {
            Self::File
        }
    }

    /// Whether this kind holds other objects.
    pub const fn is_folder(self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// A single object in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Stable unique identifier.
    pub id: String,
    /// Display name (not unique across the store).
    pub name: String,
    /// Object kind.
    pub kind: ObjectKind,
    /// Raw MIME type as reported by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Declared size in bytes. Absent for folders and documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// First parent folder, if the store reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl RemoteObject {
    /// Create an object with just identity, name and kind.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            mime_type: None,
            size: None,
            parent_id: None,
        }
    }

    /// Set the declared size.
    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the parent folder.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the raw MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub const fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime_type() {
        assert_eq!(ObjectKind::from_mime_type(FOLDER_MIME_TYPE), ObjectKind::Folder);
        assert_eq!(
            ObjectKind::from_mime_type("application/vnd.google-apps.document"),
            ObjectKind::Document
        );
        assert_eq!(ObjectKind::from_mime_type("video/x-matroska"), ObjectKind::File);
        assert_eq!(ObjectKind::from_mime_type(""), ObjectKind::File);
    }

    #[test]
    fn test_builder() {
        let obj = RemoteObject::new("abc", "movie.mkv", ObjectKind::File)
            .with_size(42)
            .with_parent("root");
        assert_eq!(obj.size, Some(42));
        assert_eq!(obj.parent_id.as_deref(), Some("root"));
        assert!(!obj.is_folder());
    }
}
