//! Folder expansion.
//!
//! Two explicit steps: find a folder by name (folder-scoped containment
//! query), then list its direct children by id. Sub-folders are returned as
//! entries, never descended into.

use std::sync::Arc;
use std::time::Instant;

use driveloader_core::domain::{KindFilter, ObjectQuery, RemoteObject};
use driveloader_core::download::{DownloadError, DownloadResult};
use driveloader_core::ports::RemoteStorePort;

/// A folder to expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRef {
    /// Look the folder up by (partial) name.
    Name(String),
    /// Already resolved.
    Object(RemoteObject),
}

/// Picks one folder when several match a name.
#[cfg_attr(test, mockall::automock)]
pub trait Disambiguator: Send + Sync {
    /// Index into `candidates`, or `None` to give up.
    fn choose(&self, name: &str, candidates: &[RemoteObject]) -> Option<usize>;
}

/// Always takes the first candidate. Used when nobody can be asked.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl Disambiguator for FirstMatch {
    fn choose(&self, _name: &str, candidates: &[RemoteObject]) -> Option<usize> {
        (!candidates.is_empty()).then_some(0)
    }
}

pub struct FolderExpander {
    store: Arc<dyn RemoteStorePort>,
    disambiguator: Arc<dyn Disambiguator>,
}

impl FolderExpander {
    pub fn new(store: Arc<dyn RemoteStorePort>) -> Self {
        Self {
            store,
            disambiguator: Arc::new(FirstMatch),
        }
    }

    #[must_use]
    pub fn with_disambiguator(mut self, disambiguator: Arc<dyn Disambiguator>) -> Self {
        self.disambiguator = disambiguator;
        self
    }

    /// Find the folder called `name`.
    pub async fn find_folder(&self, name: &str) -> DownloadResult<RemoteObject> {
        let mut folders = self
            .store
            .list(&ObjectQuery::name_contains(name).with_kind(KindFilter::Folder))
            .await?;

        match folders.len() {
            0 => Err(DownloadError::not_found(name)),
            1 => Ok(folders.swap_remove(0)),
            count => {
                let choice = self
                    .disambiguator
                    .choose(name, &folders)
                    .filter(|&i| i < count)
                    .ok_or_else(|| DownloadError::ambiguous(name, count))?;
                tracing::debug!(name, count, choice, "Disambiguated folder");
                Ok(folders.swap_remove(choice))
            }
        }
    }

    /// Direct children of `folder`. An empty folder is an error.
    pub async fn list_children(&self, folder: &RemoteObject) -> DownloadResult<Vec<RemoteObject>> {
        let children = self.store.list(&ObjectQuery::children_of(&folder.id)).await?;
        if children.is_empty() {
            return Err(DownloadError::empty_folder(&folder.name));
        }
        Ok(children)
    }

    /// Resolve `folder` if needed and list its children.
    pub async fn expand(
        &self,
        folder: FolderRef,
    ) -> DownloadResult<(RemoteObject, Vec<RemoteObject>)> {
        let started = Instant::now();
        let folder = match folder {
            FolderRef::Name(name) => self.find_folder(&name).await?,
            FolderRef::Object(object) => object,
        };
        let children = self.list_children(&folder).await?;
        tracing::debug!(
            folder = %folder.name,
            id = %folder.id,
            children = children.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Expanded folder"
        );
        Ok((folder, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;
    use driveloader_core::domain::ObjectKind;

    fn store() -> Arc<FakeStore> {
        Arc::new(
            FakeStore::new()
                .with_folder("t1", "Trip Photos", None)
                .with_folder("t2", "Trip Photos (old)", None)
                .with_folder("empty", "Empty Box", None)
                .with_file("p1", "beach.jpg", Some("t1"), "x")
                .with_folder("sub", "Raw", Some("t1"))
                .with_file("p2", "dunes.jpg", Some("t2"), "x"),
        )
    }

    #[tokio::test]
    async fn test_expand_by_name_defaults_to_first_match() {
        let expander = FolderExpander::new(store());
        let (folder, children) = expander
            .expand(FolderRef::Name("Trip Photos".to_string()))
            .await
            .unwrap();
        assert_eq!(folder.id, "t1");
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["beach.jpg", "Raw"]);
        assert_eq!(children[1].kind, ObjectKind::Folder);
    }

    #[tokio::test]
    async fn test_disambiguator_is_consulted() {
        let mut chooser = MockDisambiguator::new();
        chooser
            .expect_choose()
            .withf(|name, candidates| name.to_string() == "Trip" && candidates.len() == 2)
            .times(1)
            .returning(|_, _| Some(1));

        let expander = FolderExpander::new(store()).with_disambiguator(Arc::new(chooser));
        let folder = expander.find_folder("Trip").await.unwrap();
        assert_eq!(folder.id, "t2");
    }

    #[tokio::test]
    async fn test_declined_choice_is_ambiguous() {
        let mut chooser = MockDisambiguator::new();
        chooser.expect_choose().returning(|_, _| None);

        let expander = FolderExpander::new(store()).with_disambiguator(Arc::new(chooser));
        let err = expander.find_folder("Trip").await.unwrap_err();
        assert_eq!(err, DownloadError::ambiguous("Trip", 2));
    }

    #[tokio::test]
    async fn test_out_of_range_choice_is_ambiguous() {
        let mut chooser = MockDisambiguator::new();
        chooser.expect_choose().returning(|_, _| Some(7));

        let expander = FolderExpander::new(store()).with_disambiguator(Arc::new(chooser));
        assert!(expander.find_folder("Trip").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let expander = FolderExpander::new(store());
        let err = expander
            .expand(FolderRef::Name("Holiday".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, DownloadError::not_found("Holiday"));
    }

    #[tokio::test]
    async fn test_empty_folder_is_an_error() {
        let expander = FolderExpander::new(store());
        let err = expander
            .expand(FolderRef::Name("Empty Box".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, DownloadError::empty_folder("Empty Box"));
    }

    #[tokio::test]
    async fn test_expand_known_object_skips_lookup() {
        let store = store();
        let expander = FolderExpander::new(store.clone());
        let folder = RemoteObject::new("t2", "Trip Photos (old)", ObjectKind::Folder);
        let (_, children) = expander.expand(FolderRef::Object(folder)).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(store.list_calls(), 1);
    }
}
