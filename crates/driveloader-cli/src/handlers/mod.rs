//! Command handlers.
//!
//! Download handlers return the `BatchReport` so `main` can pick the exit
//! code; lookup handlers print and return nothing.

pub mod download;
pub mod ls;
pub mod resolve;
pub mod run;
