//! Main commands enum and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Where a download command writes, and how file names are scoped.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target directory; relative paths hang off the configured base target
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Parent folder id used to narrow ambiguous file names
    #[arg(long)]
    pub parent: Option<String>,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Execute every DOWNLOAD line of an instruction file
    Run {
        /// Instruction file
        #[arg(short, long, default_value = "instructions.ini")]
        instructions: PathBuf,
    },

    /// Download individual files by name
    Files {
        /// File names (partial names are matched by containment)
        #[arg(required = true)]
        names: Vec<String>,
        #[command(flatten)]
        target: TargetArgs,
        /// Put each file in a sub-folder named after it
        #[arg(long = "per-item-subfolder")]
        per_item_subfolder: bool,
    },

    /// Download the direct children of folders
    Folders {
        /// Folder names
        #[arg(required = true)]
        names: Vec<String>,
        #[command(flatten)]
        target: TargetArgs,
        /// Treat each folder's sub-folders as the folders to download
        #[arg(long)]
        nested: bool,
    },

    /// Download folders looked up in the film catalog
    Derived {
        /// Search terms (e.g. director names)
        #[arg(required = true)]
        terms: Vec<String>,
        /// Catalog field the terms are matched against
        #[arg(long, default_value = "director")]
        field: String,
        /// Film catalog (JSON); defaults to the settings' catalog_file
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the id a name resolves to
    Resolve {
        /// Object name
        name: String,
        /// Parent folder id used to narrow the match
        #[arg(long)]
        parent: Option<String>,
    },

    /// List the direct children of a folder
    Ls {
        /// Folder name
        folder: String,
    },
}
