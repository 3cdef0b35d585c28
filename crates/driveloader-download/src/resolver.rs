//! Name resolution.
//!
//! Turns a human-supplied name, optionally scoped to a parent folder, into
//! exactly one remote object. Names match by case-sensitive containment, so
//! partial names are accepted and several objects may match.

use std::sync::Arc;
use std::time::Instant;

use driveloader_core::domain::{ObjectQuery, RemoteObject};
use driveloader_core::download::{DownloadError, DownloadResult};
use driveloader_core::ports::RemoteStorePort;

/// What to do when more than one object still matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Fail with `Ambiguous`.
    #[default]
    Strict,
    /// Take the first match the store returned and log a warning.
    BestEffort,
}

impl AmbiguityPolicy {
    pub const fn from_best_effort(best_effort: bool) -> Self {
        if best_effort {
            Self::BestEffort
        } else {
            Self::Strict
        }
    }
}

pub struct NameResolver {
    store: Arc<dyn RemoteStorePort>,
    policy: AmbiguityPolicy,
}

impl NameResolver {
    pub fn new(store: Arc<dyn RemoteStorePort>) -> Self {
        Self {
            store,
            policy: AmbiguityPolicy::Strict,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }

    /// Resolve `name` to its object id.
    pub async fn resolve(&self, name: &str, parent_id: Option<&str>) -> DownloadResult<String> {
        self.resolve_object(name, parent_id).await.map(|o| o.id)
    }

    /// Resolve `name` to the matching object.
    ///
    /// The parent only narrows the search when the unscoped query is
    /// ambiguous.
    pub async fn resolve_object(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> DownloadResult<RemoteObject> {
        let started = Instant::now();
        let matches = self.store.list(&ObjectQuery::name_contains(name)).await?;

        let result = match (matches.len(), parent_id) {
            (0, _) => Err(DownloadError::not_found(name)),
            (1, _) => Ok(first(matches)),
            (_, Some(parent)) => {
                let scoped = self
                    .store
                    .list(&ObjectQuery::name_contains(name).with_parent(parent))
                    .await?;
                match scoped.len() {
                    0 => Err(DownloadError::not_found(name)),
                    1 => Ok(first(scoped)),
                    _ => self.pick(name, scoped),
                }
            }
            (_, None) => self.pick(name, matches),
        };

        tracing::debug!(
            name,
            parent = parent_id.unwrap_or("-"),
            elapsed_ms = started.elapsed().as_millis(),
            ok = result.is_ok(),
            "Resolved name"
        );
        result
    }

    fn pick(&self, name: &str, candidates: Vec<RemoteObject>) -> DownloadResult<RemoteObject> {
        match self.policy {
            AmbiguityPolicy::Strict => Err(DownloadError::ambiguous(name, candidates.len())),
            AmbiguityPolicy::BestEffort => {
                tracing::warn!(
                    name,
                    matches = candidates.len(),
                    "Ambiguous name, taking the first match"
                );
                Ok(first(candidates))
            }
        }
    }
}

fn first(mut objects: Vec<RemoteObject>) -> RemoteObject {
    objects.swap_remove(0)
}
