//! CLI argument definitions using clap
//!
//! Commands:
//! - fabload generate [--weather <file>] [--seed <n>]
//! - fabload shred
//! - fabload provision [--sqlite <file>]
//! - fabload load [--sqlite <file>]
//! - fabload run [--sqlite <file>]
//! - fabload view [--sqlite <file>] [--entity <name>] [--limit <n>]
//!
//! Every command accepts `--config` and `--date`.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// fabload - daily shred, reconcile and load of fab telemetry
#[derive(Parser, Debug)]
#[command(name = "fabload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to pipeline configuration file (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Batch date (YYYY-MM-DD); defaults to today minus the configured lag
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Destination selection
#[derive(Args, Debug, Clone, Default)]
pub struct DestinationArgs {
    /// Load into this SQLite file instead of MySQL
    #[arg(long)]
    pub sqlite: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the wide batch for the batch date
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// Open-Meteo archive response to take Meteorology rows from
        #[arg(long)]
        weather: Option<PathBuf>,

        /// Override the configured producer seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Split the wide batch into per-entity artifacts
    Shred {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Create the entity tables in the namespace if absent
    Provision {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        destination: DestinationArgs,
    },

    /// Reconcile and load existing artifacts
    Load {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        destination: DestinationArgs,
    },

    /// Shred then load
    Run {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        destination: DestinationArgs,
    },

    /// Print rows from the entity tables
    View {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        destination: DestinationArgs,

        /// Only this entity (all registered entities when omitted)
        #[arg(long)]
        entity: Option<String>,

        /// Rows per table (1 to 1000)
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
