//! Main CLI parser and top-level argument handling.
//!
//! Global options override the settings file for this invocation.

use std::path::PathBuf;

use clap::Parser;

use driveloader_core::settings::LedgerMatch;

use crate::commands::Commands;

/// Environment variable holding the Drive access token.
pub const TOKEN_ENV: &str = "DRIVELOADER_TOKEN";

/// Download files and folders from Google Drive by name.
#[derive(Parser)]
#[command(name = "driveloader")]
#[command(about = "Download Google Drive files and folders by name, resumably")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, default_value = "settings.json")]
    pub settings: PathBuf,

    /// OAuth access token for the Drive API
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Read the access token from a file (plain text or JSON with `access_token`)
    #[arg(long = "token-file", global = true, conflicts_with = "token")]
    pub token_file: Option<PathBuf>,

    /// Take the first match when a file name is ambiguous
    #[arg(long = "best-effort", global = true)]
    pub best_effort: bool,

    /// How the completion ledger matches names: exact or substring
    #[arg(long = "ledger-match", global = true)]
    pub ledger_match: Option<LedgerMatch>,

    /// Chunk size in MiB
    #[arg(long = "chunk-size-mib", global = true, value_parser = clap::value_parser!(u64).range(1..=1024))]
    pub chunk_size_mib: Option<u64>,

    /// Never prompt; ambiguous folders take the first match
    #[arg(long = "non-interactive", global = true)]
    pub non_interactive: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Commands;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "driveloader",
            "--ledger-match",
            "substring",
            "--chunk-size-mib",
            "150",
            "-v",
            "files",
            "a.txt",
            "b.txt",
            "--target",
            "/out",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.ledger_match, Some(LedgerMatch::Substring));
        assert_eq!(cli.chunk_size_mib, Some(150));
        match cli.command {
            Some(Commands::Files { names, target, .. }) => {
                assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
                assert_eq!(target.target, Some(PathBuf::from("/out")));
            }
            _ => panic!("expected files command"),
        }
    }

    #[test]
    fn test_run_instructions() {
        let cli = Cli::parse_from(["driveloader", "run"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Run { ref instructions }) if instructions == &PathBuf::from("instructions.ini")
        ));

        let cli = Cli::parse_from(["driveloader", "run", "--instructions", "jobs.ini"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Run { ref instructions }) if instructions == &PathBuf::from("jobs.ini")
        ));
    }

    #[test]
    fn test_chunk_size_range() {
        assert!(Cli::try_parse_from(["driveloader", "--chunk-size-mib", "0", "ls", "x"]).is_err());
    }

    #[test]
    fn test_token_and_token_file_conflict() {
        let result = Cli::try_parse_from([
            "driveloader",
            "--token",
            "abc",
            "--token-file",
            "/tmp/token",
            "ls",
            "x",
        ]);
        assert!(result.is_err());
    }
}
