//! Loading a run configuration: settings plus the instruction file.

use std::path::Path;

use thiserror::Error;

use crate::download::DownloadJob;
use crate::instructions::{InstructionError, load_instructions};
use crate::settings::SettingsError;

/// Anything that stops a configuration from loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Instructions(#[from] InstructionError),
}

/// Read an instruction file and turn every line into a job under `base_target`.
pub fn load_jobs(path: &Path, base_target: &Path) -> Result<Vec<DownloadJob>, ConfigError> {
    let jobs = load_instructions(path)?
        .iter()
        .map(|instruction| instruction.to_job(base_target))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(path = %path.display(), jobs = jobs.len(), "Loaded instructions");
    Ok(jobs)
}
