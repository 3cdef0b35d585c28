//! Instruction file parsing.
//!
//! An instruction file holds one job per `DOWNLOAD=` line:
//!
//! ```text
//! # method | names separated by ^ | target | special
//! DOWNLOAD=FileDownload|Close-Up.mkv^Taste of Cherry.mkv|Movies|True
//! DOWNLOAD=FolderDownload|Trip Photos|.|False
//! DOWNLOAD=Custom|Abbas Kiarostami|Directors|Director
//! ```
//!
//! Other keys, blank lines and `#`/`;` comments are ignored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::download::{DownloadJob, JobKind};

const NAME_SEPARATOR: char = '^';
const FIELD_SEPARATOR: char = '|';
const DOWNLOAD_KEY: &str = "DOWNLOAD";

/// Which handler an instruction selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMethod {
    /// Individual files by name.
    FileDownload,
    /// Folders by name (nested when `special` is true).
    FolderDownload,
    /// Folder names derived from the catalog.
    Custom,
}

impl FromStr for JobMethod {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "FileDownload" => Ok(Self::FileDownload),
            "FolderDownload" => Ok(Self::FolderDownload),
            "Custom" => Ok(Self::Custom),
            other => Err(InstructionError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for JobMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileDownload => f.write_str("FileDownload"),
            Self::FolderDownload => f.write_str("FolderDownload"),
            Self::Custom => f.write_str("Custom"),
        }
    }
}

/// Errors while reading an instruction file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstructionError {
    #[error("Unknown download method '{0}'")]
    UnknownMethod(String),

    #[error("Line {line}: expected 'method|names|target[|special]', got {fields} field(s)")]
    MissingFields { line: usize, fields: usize },

    #[error("Line {line}: no names given")]
    NoNames { line: usize },

    #[error("Line {line}: '{value}' is not a boolean")]
    InvalidFlag { line: usize, value: String },

    #[error("Line {line}: Custom instructions need a lookup field (e.g. Director)")]
    MissingLookupField { line: usize },

    #[error("Line {line}: {source}")]
    Method {
        line: usize,
        #[source]
        source: Box<InstructionError>,
    },

    #[error("Failed to read instruction file {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// One parsed `DOWNLOAD=` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 1-based line number, for error messages.
    pub line: usize,
    pub method: JobMethod,
    pub args: Vec<String>,
    pub target: String,
    pub special: Option<String>,
}

impl Instruction {
    /// Turn the instruction into a typed job rooted under `base_target`.
    pub fn to_job(&self, base_target: &Path) -> Result<DownloadJob, InstructionError> {
        let target_dir = resolve_target(&self.target, base_target);
        let job = match self.method {
            JobMethod::FileDownload => {
                let per_item = parse_flag(self.special.as_deref(), self.line)?;
                DownloadJob::new(JobKind::SingleFileSet, self.args.clone(), target_dir)
                    .with_per_item_subfolder(per_item)
            }
            JobMethod::FolderDownload => {
                let kind = if parse_flag(self.special.as_deref(), self.line)? {
                    JobKind::NestedFolderTree
                } else {
                    JobKind::FlatFolderSet
                };
                DownloadJob::new(kind, self.args.clone(), target_dir)
            }
            JobMethod::Custom => {
                let field = self
                    .special
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(InstructionError::MissingLookupField { line: self.line })?;
                DownloadJob::new(
                    JobKind::DerivedFolderSet {
                        field: field.to_ascii_lowercase(),
                    },
                    self.args.clone(),
                    target_dir,
                )
            }
        };
        Ok(job)
    }
}

/// Resolve a job target: `.` is the base, relative paths hang off the base,
/// absolute paths are used as-is.
pub fn resolve_target(target: &str, base_target: &Path) -> PathBuf {
    let trimmed = target.trim();
    if trimmed.is_empty() || trimmed == "." {
        return base_target.to_path_buf();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_target.join(path)
    }
}

fn parse_flag(raw: Option<&str>, line: usize) -> Result<bool, InstructionError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "none" => Ok(false),
            _ => Err(InstructionError::InvalidFlag {
                line,
                value: v.to_string(),
            }),
        },
    }
}

/// Parse the text of an instruction file.
pub fn parse_instructions(text: &str) -> Result<Vec<Instruction>, InstructionError> {
    let mut out = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            tracing::debug!(line, "Ignoring instruction line without '='");
            continue;
        };
        if key.trim() != DOWNLOAD_KEY {
            tracing::debug!(line, key = key.trim(), "Ignoring non-download instruction");
            continue;
        }

        let fields: Vec<&str> = value.split(FIELD_SEPARATOR).collect();
        if !(3..=4).contains(&fields.len()) {
            return Err(InstructionError::MissingFields {
                line,
                fields: fields.len(),
            });
        }

        let method = fields[0]
            .parse::<JobMethod>()
            .map_err(|e| InstructionError::Method {
                line,
                source: Box::new(e),
            })?;

        let args: Vec<String> = fields[1]
            .split(NAME_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if args.is_empty() {
            return Err(InstructionError::NoNames { line });
        }

        out.push(Instruction {
            line,
            method,
            args,
            target: fields[2].trim().to_string(),
            special: fields.get(3).map(|s| s.trim().to_string()),
        });
    }

    Ok(out)
}

/// Read and parse an instruction file.
pub fn load_instructions(path: &Path) -> Result<Vec<Instruction>, InstructionError> {
    let text = std::fs::read_to_string(path).map_err(|e| InstructionError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_instructions(&text)
}
