//! Small helpers shared by the download core and the CLI.

pub mod format;

pub use format::{format_hms, format_size, format_speed};
