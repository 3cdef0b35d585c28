//! Download domain types: jobs, errors and reports.

mod errors;
mod job;
mod report;

pub use errors::{DownloadError, DownloadResult};
pub use job::{DownloadJob, JobKind};
pub use report::{BatchReport, GroupFailure, ItemOutcome, ItemReport, TransferOutcome};
