//! Terminal output: live transfer progress and batch summaries.
//!
//! Format-only; nothing here decides what gets downloaded.

pub mod progress;
pub mod summary;

pub use progress::CliProgress;
pub use summary::{print_job_header, print_report, print_totals};
