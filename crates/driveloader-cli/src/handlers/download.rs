//! `files`, `folders` and `derived`: one ad-hoc job from the command line.

use tokio_util::sync::CancellationToken;

use driveloader_core::download::{BatchReport, DownloadJob, JobKind};

use crate::bootstrap::CliContext;
use crate::commands::TargetArgs;
use crate::presentation::{print_job_header, print_report};

pub async fn files(
    ctx: &CliContext,
    names: Vec<String>,
    target: &TargetArgs,
    per_item_subfolder: bool,
    cancel: &CancellationToken,
) -> BatchReport {
    let job = job(ctx, JobKind::SingleFileSet, names, target)
        .with_per_item_subfolder(per_item_subfolder);
    execute(ctx, &job, cancel).await
}

pub async fn folders(
    ctx: &CliContext,
    names: Vec<String>,
    target: &TargetArgs,
    nested: bool,
    cancel: &CancellationToken,
) -> BatchReport {
    let kind = if nested {
        JobKind::NestedFolderTree
    } else {
        JobKind::FlatFolderSet
    };
    let job = job(ctx, kind, names, target);
    execute(ctx, &job, cancel).await
}

pub async fn derived(
    ctx: &CliContext,
    terms: Vec<String>,
    field: &str,
    target: &TargetArgs,
    cancel: &CancellationToken,
) -> BatchReport {
    let kind = JobKind::DerivedFolderSet {
        field: field.to_ascii_lowercase(),
    };
    let job = job(ctx, kind, terms, target);
    execute(ctx, &job, cancel).await
}

fn job(ctx: &CliContext, kind: JobKind, names: Vec<String>, target: &TargetArgs) -> DownloadJob {
    DownloadJob::new(kind, names, ctx.target_dir(target.target.as_deref()))
        .with_parent_id(target.parent.clone())
}

async fn execute(ctx: &CliContext, job: &DownloadJob, cancel: &CancellationToken) -> BatchReport {
    print_job_header(1, 1, job);
    let report = ctx.orchestrator().run(job, cancel).await;
    print_report(&report);
    report
}
