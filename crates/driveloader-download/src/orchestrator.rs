//! Job orchestration.
//!
//! `DownloadOrchestrator::run` dispatches on the job kind and walks its names
//! strictly in order. Every file is its own unit: a failure is recorded in
//! the batch report and the loop moves on. Cancellation is the one exception;
//! it removes the half-written file and stops the batch.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use driveloader_core::domain::RemoteObject;
use driveloader_core::download::{
    BatchReport, DownloadError, DownloadJob, ItemOutcome, ItemReport, JobKind,
};
use driveloader_core::ports::{CandidateCatalog, EmptyCatalog, RemoteStorePort};
use driveloader_core::settings::{DEFAULT_LEDGER_FILE, LedgerMatch, Settings};
use driveloader_core::utils::{format_hms, format_size};

use crate::expander::{Disambiguator, FolderExpander, FolderRef};
use crate::ledger::CompletionLedger;
use crate::progress::{NoopReporter, ProgressReporter};
use crate::resolver::{AmbiguityPolicy, NameResolver};
use crate::transfer::{ChunkedDownloader, TransferConfig};

/// Knobs for one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub transfer: TransferConfig,
    pub ambiguity: AmbiguityPolicy,
    /// Ledger file name inside each target directory.
    pub ledger_file: String,
    pub ledger_match: LedgerMatch,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            transfer: TransferConfig::default(),
            ambiguity: AmbiguityPolicy::Strict,
            ledger_file: DEFAULT_LEDGER_FILE.to_string(),
            ledger_match: LedgerMatch::Exact,
        }
    }
}

impl OrchestratorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            transfer: TransferConfig::from_settings(settings),
            ambiguity: AmbiguityPolicy::from_best_effort(settings.effective_best_effort()),
            ledger_file: settings.effective_ledger_file().to_string(),
            ledger_match: settings.effective_ledger_match(),
        }
    }
}

pub struct DownloadOrchestrator {
    store: Arc<dyn RemoteStorePort>,
    resolver: NameResolver,
    expander: FolderExpander,
    downloader: ChunkedDownloader,
    catalog: Arc<dyn CandidateCatalog>,
    reporter: Arc<dyn ProgressReporter>,
    options: OrchestratorOptions,
}

impl DownloadOrchestrator {
    pub fn new(store: Arc<dyn RemoteStorePort>, options: OrchestratorOptions) -> Self {
        Self {
            resolver: NameResolver::new(Arc::clone(&store)).with_policy(options.ambiguity),
            expander: FolderExpander::new(Arc::clone(&store)),
            downloader: ChunkedDownloader::new(Arc::clone(&store), options.transfer.clone()),
            catalog: Arc::new(EmptyCatalog),
            reporter: Arc::new(NoopReporter),
            store,
            options,
        }
    }

    #[must_use]
    pub fn with_disambiguator(mut self, disambiguator: Arc<dyn Disambiguator>) -> Self {
        self.expander = FolderExpander::new(Arc::clone(&self.store)).with_disambiguator(disambiguator);
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn CandidateCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub const fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub const fn expander(&self) -> &FolderExpander {
        &self.expander
    }

    pub const fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    /// Run one job to completion (or until `cancel` fires).
    pub async fn run(&self, job: &DownloadJob, cancel: &CancellationToken) -> BatchReport {
        let started = Instant::now();
        tracing::info!(
            kind = job.kind.label(),
            names = job.names.len(),
            target = %job.target_dir.display(),
            "Starting job"
        );

        let mut report = BatchReport::new();
        let flow = match &job.kind {
            JobKind::SingleFileSet => self.run_files(job, &mut report, cancel).await,
            JobKind::FlatFolderSet => {
                self.run_folders(&job.names, &job.target_dir, &mut report, cancel)
                    .await
            }
            JobKind::NestedFolderTree => {
                self.run_trees(&job.names, &job.target_dir, &mut report, cancel)
                    .await
            }
            JobKind::DerivedFolderSet { field } => {
                self.run_derived(field, &job.names, &job.target_dir, &mut report, cancel)
                    .await
            }
        };
        report.interrupted |= flow.is_break();

        tracing::info!(
            kind = job.kind.label(),
            downloaded = report.transferred(),
            exported = report.exported(),
            skipped = report.already_complete(),
            failed = report.failed(),
            folders_failed = report.group_failures.len(),
            bytes = %format_size(report.bytes_written()),
            elapsed = %format_hms(started.elapsed()),
            interrupted = report.interrupted,
            "Job finished"
        );
        report
    }

    /// Each name is one file, resolved (optionally under `job.parent_id`).
    async fn run_files(
        &self,
        job: &DownloadJob,
        report: &mut BatchReport,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        for name in &job.names {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let local_name = local_file_name(name);
            let dir = if job.per_item_subfolder {
                job.target_dir.join(item_folder_name(&local_name))
            } else {
                job.target_dir.clone()
            };
            let ledger = self.ledger_for(&dir);

            match ledger.is_complete(&local_name) {
                Ok(true) => {
                    tracing::info!(name = %name, "Already downloaded, skipping");
                    report.push_item(ItemReport::new(name, &dir, Ok(ItemOutcome::AlreadyComplete)));
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Cannot read completion ledger");
                    report.push_item(ItemReport::new(name, &dir, Err(e)));
                    continue;
                }
            }

            let object = match self
                .resolver
                .resolve_object(name, job.parent_id.as_deref())
                .await
            {
                Ok(object) => object,
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Skipping file");
                    report.push_item(ItemReport::new(name, &dir, Err(e)));
                    continue;
                }
            };

            let (item, flow) = self
                .transfer_item(name, &object, &local_name, &dir, &ledger, cancel)
                .await;
            report.push_item(item);
            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }

    /// Each name is a folder; its direct children land in `target/name`.
    async fn run_folders(
        &self,
        names: &[String],
        target: &Path,
        report: &mut BatchReport,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        for (index, name) in names.iter().enumerate() {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let children = match self.expander.expand(FolderRef::Name(name.clone())).await {
                Ok((_, children)) => children,
                Err(e) => {
                    tracing::warn!(folder = %name, error = %e, "Skipping folder");
                    report.push_group_failure(name, e);
                    continue;
                }
            };

            tracing::info!(
                folder = %name,
                position = index + 1,
                of = names.len(),
                children = children.len(),
                "Downloading folder"
            );
            let dir = target.join(local_file_name(name));
            if self.run_children(&children, &dir, report, cancel).await.is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Each name is a folder whose sub-folders form a flat folder set.
    async fn run_trees(
        &self,
        names: &[String],
        target: &Path,
        report: &mut BatchReport,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        for name in names {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let (root, children) = match self.expander.expand(FolderRef::Name(name.clone())).await
            {
                Ok(expanded) => expanded,
                Err(e) => {
                    tracing::warn!(folder = %name, error = %e, "Skipping folder tree");
                    report.push_group_failure(name, e);
                    continue;
                }
            };

            let subfolders: Vec<RemoteObject> =
                children.into_iter().filter(RemoteObject::is_folder).collect();
            if subfolders.is_empty() {
                tracing::warn!(folder = %root.name, "Folder has no sub-folders");
                report.push_group_failure(name, DownloadError::empty_folder(&root.name));
                continue;
            }

            for sub in subfolders {
                if cancel.is_cancelled() {
                    return ControlFlow::Break(());
                }
                let sub_name = sub.name.clone();
                let children = match self.expander.expand(FolderRef::Object(sub)).await {
                    Ok((_, children)) => children,
                    Err(e) => {
                        tracing::warn!(folder = %sub_name, error = %e, "Skipping folder");
                        report.push_group_failure(&sub_name, e);
                        continue;
                    }
                };
                let dir = target.join(local_file_name(&sub_name));
                if self.run_children(&children, &dir, report, cancel).await.is_break() {
                    return ControlFlow::Break(());
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Each name is a search term; its catalog candidates are downloaded as
    /// folders into `target/term`.
    async fn run_derived(
        &self,
        field: &str,
        terms: &[String],
        target: &Path,
        report: &mut BatchReport,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        for term in terms {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let folders = match self.catalog.lookup(field, term) {
                Ok(folders) => folders,
                Err(e) => {
                    tracing::warn!(term = %term, field, error = %e, "Catalog lookup failed");
                    report.push_group_failure(term, DownloadError::catalog(e.to_string()));
                    continue;
                }
            };
            if folders.is_empty() {
                tracing::info!(term = %term, field, "No candidates, nothing to download");
                report.empty_lookups.push(term.clone());
                continue;
            }

            tracing::info!(term = %term, candidates = folders.len(), "Downloading candidates");
            let dir = target.join(local_file_name(term));
            if self.run_folders(&folders, &dir, report, cancel).await.is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Download the files among `children` into `dir`. Sub-folders are not
    /// descended into.
    async fn run_children(
        &self,
        children: &[RemoteObject],
        dir: &Path,
        report: &mut BatchReport,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        let ledger = self.ledger_for(dir);

        for child in children {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }
            if child.is_folder() {
                tracing::info!(folder = %child.name, "Skipping sub-folder");
                continue;
            }

            let local_name = local_file_name(&child.name);
            match ledger.is_complete(&local_name) {
                Ok(true) => {
                    tracing::info!(name = %child.name, "Already downloaded, skipping");
                    report.push_item(ItemReport::new(
                        &child.name,
                        dir,
                        Ok(ItemOutcome::AlreadyComplete),
                    ));
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(name = %child.name, error = %e, "Cannot read completion ledger");
                    report.push_item(ItemReport::new(&child.name, dir, Err(e)));
                    continue;
                }
            }

            let (item, flow) = self
                .transfer_item(&child.name, child, &local_name, dir, &ledger, cancel)
                .await;
            report.push_item(item);
            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }

    /// Transfer one resolved object and record it in the ledger.
    async fn transfer_item(
        &self,
        name: &str,
        object: &RemoteObject,
        local_name: &str,
        dir: &Path,
        ledger: &CompletionLedger,
        cancel: &CancellationToken,
    ) -> (ItemReport, ControlFlow<()>) {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            let err = DownloadError::from_io_error(&e);
            tracing::warn!(name, dir = %dir.display(), error = %err, "Cannot create directory");
            return (ItemReport::new(name, dir, Err(err)), ControlFlow::Continue(()));
        }

        let dest = dir.join(local_name);
        let result = self
            .downloader
            .download(object, &dest, self.reporter.as_ref(), cancel)
            .await;

        match result {
            Ok(outcome) => {
                if let Err(e) = ledger.mark_complete(local_name) {
                    tracing::warn!(name, error = %e, "Downloaded but could not record completion");
                    return (ItemReport::new(name, dir, Err(e)), ControlFlow::Continue(()));
                }
                tracing::info!(
                    name,
                    path = %outcome.final_path.display(),
                    bytes = %format_size(outcome.bytes_written),
                    exported = outcome.fallback_used,
                    "Saved"
                );
                (
                    ItemReport::new(name, dir, Ok(ItemOutcome::Transferred(outcome))),
                    ControlFlow::Continue(()),
                )
            }
            Err(e) if e.is_interrupted() => {
                discard_partial(&dest, local_name, ledger).await;
                (ItemReport::new(name, dir, Err(e)), ControlFlow::Break(()))
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "Download failed");
                discard_partial(&dest, local_name, ledger).await;
                (ItemReport::new(name, dir, Err(e)), ControlFlow::Continue(()))
            }
        }
    }

    fn ledger_for(&self, dir: &Path) -> CompletionLedger {
        CompletionLedger::for_dir(dir, &self.options.ledger_file, self.options.ledger_match)
    }
}

/// Remove `dest` after a failed or interrupted transfer unless the ledger
/// has a line for exactly this name.
async fn discard_partial(dest: &Path, local_name: &str, ledger: &CompletionLedger) {
    if ledger.has_exact_entry(local_name).unwrap_or(false) {
        return;
    }
    match tokio::fs::remove_file(dest).await {
        Ok(()) => tracing::warn!(path = %dest.display(), "Removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %dest.display(), error = %e, "Cannot remove partial file"),
    }
}

/// Name used on disk and in the ledger. Path separators cannot appear in a
/// single path component.
fn local_file_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Sub-folder for per-item layout: the file name without its extension.
fn item_folder_name(local_name: &str) -> PathBuf {
    Path::new(local_name)
        .file_stem()
        .map_or_else(|| PathBuf::from(local_name), PathBuf::from)
}
