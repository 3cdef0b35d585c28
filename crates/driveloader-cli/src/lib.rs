//! Command-line front end for driveloader.
//!
//! `main.rs` parses arguments, calls [`bootstrap`] once and dispatches to
//! [`handlers`]. Everything terminal-specific lives here.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs only
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod utils;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, TargetArgs};
pub use error::CliError;
pub use parser::Cli;
