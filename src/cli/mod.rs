//! CLI layer for claimcheck.
//!
//! Provides the command-line interface using clap, with one command per
//! pipeline operation.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, JobArgs};
