//! Batch summaries.

use std::fmt::Write;

use driveloader_core::download::{BatchReport, DownloadJob};
use driveloader_core::utils::format_size;

pub fn print_job_header(position: usize, total: usize, job: &DownloadJob) {
    println!();
    println!(
        "[{position}/{total}] {} job: {} name(s) into {}",
        job.kind.label(),
        job.names.len(),
        job.target_dir.display()
    );
}

pub fn print_report(report: &BatchReport) {
    print!("{}", render_report(report));
}

pub fn print_totals(jobs: usize, report: &BatchReport) {
    println!();
    println!("Total over {jobs} job(s):");
    print!("{}", render_report(report));
}

/// Counts first, then one line per failure in processing order.
pub fn render_report(report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  downloaded: {} ({} exported), already complete: {}, failed: {}, written: {}",
        report.transferred(),
        report.exported(),
        report.already_complete(),
        report.failed(),
        format_size(report.bytes_written())
    );

    for item in &report.items {
        if let Err(ref e) = item.result {
            let _ = writeln!(out, "  failed  {}: {e}", item.name);
        }
    }
    for failure in &report.group_failures {
        let _ = writeln!(out, "  skipped {}: {}", failure.name, failure.error);
    }
    for term in &report.empty_lookups {
        let _ = writeln!(out, "  no candidates for '{term}'");
    }
    if report.interrupted {
        let _ = writeln!(out, "  interrupted; remaining items were not attempted");
    }
    out
}
