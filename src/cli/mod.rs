//! CLI module for fabload
//!
//! Provides command-line interface for:
//! - generate: write the wide batch for a date
//! - shred: split it into per-entity artifacts
//! - provision: create the entity tables
//! - load / run: reconcile and load into the namespace
//! - view: read rows back

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, CommonArgs, DestinationArgs};
pub use commands::{generate, load, provision, run, run_batch, run_command, shred, view};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
