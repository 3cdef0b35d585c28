//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging and the Ctrl+C handler, bootstraps the
//! context and dispatches. Exit code 1 means a batch was interrupted; other
//! failures map through `CliError::exit_code`.

use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use driveloader_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads DRIVELOADER_TOKEN
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            e.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
        }
    };
    std::process::exit(code);
}

/// Logs go to stderr so progress lines on stdout stay intact.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn install_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after cleanup");
            cancel.cancel();
        }
    });
}

async fn run(mut cli: Cli) -> anyhow::Result<i32> {
    let Some(command) = cli.command.take() else {
        Cli::command().print_help()?;
        return Ok(0);
    };

    let catalog_override = match command {
        Commands::Derived { ref catalog, .. } => catalog.clone(),
        _ => None,
    };
    let config = CliConfig::from_cli(&cli).with_catalog_file(catalog_override);
    let ctx = bootstrap(&config)?;

    let cancel = CancellationToken::new();
    install_ctrl_c(cancel.clone());

    let report = match command {
        Commands::Run { instructions } => {
            handlers::run::execute(&ctx, &instructions, &cancel).await?
        }
        Commands::Files {
            names,
            target,
            per_item_subfolder,
        } => handlers::download::files(&ctx, names, &target, per_item_subfolder, &cancel).await,
        Commands::Folders {
            names,
            target,
            nested,
        } => handlers::download::folders(&ctx, names, &target, nested, &cancel).await,
        Commands::Derived {
            terms,
            field,
            target,
            ..
        } => handlers::download::derived(&ctx, terms, &field, &target, &cancel).await,
        Commands::Resolve { name, parent } => {
            handlers::resolve::execute(&ctx, &name, parent.as_deref()).await?;
            return Ok(0);
        }
        Commands::Ls { folder } => {
            handlers::ls::execute(&ctx, &folder).await?;
            return Ok(0);
        }
    };

    Ok(i32::from(report.interrupted))
}
