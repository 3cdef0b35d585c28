//! CLI bootstrap - the composition root.
//!
//! This is the only place where concrete implementations are wired
//! together: settings, the Drive client, the film catalog, the terminal
//! reporter and prompt, and the download orchestrator built on top of them.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use driveloader_core::ports::{CandidateCatalog, CatalogError, RemoteStorePort};
use driveloader_core::settings::{LedgerMatch, Settings, validate_settings};
use driveloader_download::{DownloadOrchestrator, JsonFilmCatalog, OrchestratorOptions};
use driveloader_drive::{DefaultDriveClient, DriveClientConfig};

use crate::error::CliError;
use crate::parser::Cli;
use crate::presentation::CliProgress;
use crate::utils::input::PromptDisambiguator;

/// Per-invocation overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub settings_path: PathBuf,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub best_effort: bool,
    pub ledger_match: Option<LedgerMatch>,
    pub chunk_size_mib: Option<u64>,
    pub non_interactive: bool,
    pub catalog_file: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            settings_path: cli.settings.clone(),
            token: cli.token.clone(),
            token_file: cli.token_file.clone(),
            best_effort: cli.best_effort,
            ledger_match: cli.ledger_match,
            chunk_size_mib: cli.chunk_size_mib,
            non_interactive: cli.non_interactive,
            catalog_file: None,
        }
    }

    #[must_use]
    pub fn with_catalog_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.catalog_file = path;
        }
        self
    }

    /// Fold the overrides into `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if self.best_effort {
            settings.best_effort_resolution = Some(true);
        }
        if let Some(mode) = self.ledger_match {
            settings.ledger_match = Some(mode);
        }
        if let Some(size) = self.chunk_size_mib {
            settings.chunk_size_mib = Some(size);
        }
        if self.non_interactive {
            settings.interactive = Some(false);
        }
        if let Some(ref path) = self.catalog_file {
            settings.catalog_file = Some(path.clone());
        }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Root for `.` and relative job targets.
    pub base_target: PathBuf,
    pub orchestrator: DownloadOrchestrator,
}

impl CliContext {
    pub const fn orchestrator(&self) -> &DownloadOrchestrator {
        &self.orchestrator
    }

    /// Resolve a command's `--target` against the base target.
    pub fn target_dir(&self, target: Option<&Path>) -> PathBuf {
        match target {
            Some(path) => driveloader_core::instructions::resolve_target(
                &path.to_string_lossy(),
                &self.base_target,
            ),
            None => self.base_target.clone(),
        }
    }
}

/// Catalog stand-in when none could be loaded. Every lookup fails with the
/// reason, so derived jobs report it per search term.
struct MissingCatalog {
    message: String,
}

impl CandidateCatalog for MissingCatalog {
    fn lookup(&self, _field: &str, _term: &str) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Unavailable {
            message: self.message.clone(),
        })
    }
}

/// Bootstrap the CLI application.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let mut settings = Settings::load_or_default(&config.settings_path)?;
    config.apply(&mut settings);
    validate_settings(&settings)?;

    let base_target = settings.effective_base_target(&std::env::current_dir()?);

    let token = resolve_token(config)?;
    if token.is_none() {
        tracing::warn!("No access token given; only public files will be reachable");
    }
    let client_config = DriveClientConfig::new()
        .with_user_agent(concat!("driveloader/", env!("CARGO_PKG_VERSION")))
        .with_optional_token(token);
    let store: Arc<dyn RemoteStorePort> = Arc::new(DefaultDriveClient::new(&client_config)?);

    let mut orchestrator =
        DownloadOrchestrator::new(store, OrchestratorOptions::from_settings(&settings))
            .with_catalog(load_catalog(&settings))
            .with_reporter(Arc::new(CliProgress::new()));
    if settings.effective_interactive() && std::io::stdin().is_terminal() {
        orchestrator = orchestrator.with_disambiguator(Arc::new(PromptDisambiguator));
    }

    tracing::debug!(
        base_target = %base_target.display(),
        chunk_size = settings.effective_chunk_size(),
        ledger = settings.effective_ledger_file(),
        "Bootstrapped"
    );

    Ok(CliContext {
        base_target,
        orchestrator,
    })
}

fn load_catalog(settings: &Settings) -> Arc<dyn CandidateCatalog> {
    let Some(path) = settings.catalog_file.as_deref() else {
        return Arc::new(MissingCatalog {
            message: "no catalog_file configured".to_string(),
        });
    };
    match JsonFilmCatalog::load(path) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Film catalog unavailable");
            Arc::new(MissingCatalog {
                message: e.to_string(),
            })
        }
    }
}

/// The token from `--token`/`DRIVELOADER_TOKEN`, or read from `--token-file`.
fn resolve_token(config: &CliConfig) -> Result<Option<String>, CliError> {
    if let Some(ref token) = config.token {
        return Ok(Some(token.trim().to_string()).filter(|t| !t.is_empty()));
    }
    match config.token_file {
        Some(ref path) => read_token_file(path).map(Some),
        None => Ok(None),
    }
}

/// Read a token file: either the bare token or a JSON object with an
/// `access_token` field (as written by OAuth tooling).
pub fn read_token_file(path: &Path) -> Result<String, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("cannot read token file {}: {e}", path.display())))?;
    let raw = raw.trim();

    let token = if raw.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CliError::Config(format!("invalid token file {}: {e}", path.display())))?;
        value
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                CliError::Config(format!("token file {} has no access_token", path.display()))
            })?
    } else {
        raw.to_string()
    };

    if token.is_empty() {
        return Err(CliError::Config(format!("token file {} is empty", path.display())));
    }
    Ok(token)
}
