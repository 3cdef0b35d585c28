//! `run`: execute an instruction file.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use driveloader_core::config::load_jobs;
use driveloader_core::download::BatchReport;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_job_header, print_report, print_totals};

/// Run every job in `instructions`, in file order. Stops after a job that
/// was interrupted.
pub async fn execute(
    ctx: &CliContext,
    instructions: &Path,
    cancel: &CancellationToken,
) -> Result<BatchReport, CliError> {
    let jobs = load_jobs(instructions, &ctx.base_target)?;
    tracing::info!(
        path = %instructions.display(),
        jobs = jobs.len(),
        "Loaded instructions"
    );

    let mut total = BatchReport::new();
    let mut ran = 0;
    for (index, job) in jobs.iter().enumerate() {
        print_job_header(index + 1, jobs.len(), job);
        let report = ctx.orchestrator().run(job, cancel).await;
        print_report(&report);
        ran += 1;

        let interrupted = report.interrupted;
        total.merge(report);
        if interrupted {
            break;
        }
    }

    if ran > 1 {
        print_totals(ran, &total);
    }
    Ok(total)
}
