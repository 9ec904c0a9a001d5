//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// keyed-gate: replays debounce and throttle scenarios
///
/// Builds the engines described in a scenario file, feeds them the
/// scripted triggers and evictions on a timeline, then shuts everything
/// down and reports what fired.
#[derive(Debug, Parser)]
#[command(name = "keyed-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the scenario file (required for run mode)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Delay in milliseconds for engines that do not set `delay_ms`
    #[arg(long = "default-delay", value_name = "MS")]
    pub default_delay: Option<u64>,

    /// Shut down every engine at the end, ignoring `auto_shutdown = false`
    #[arg(long = "shutdown-all")]
    pub shutdown_all: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for keyed-gate
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a scenario template
    Init {
        /// Output path for the scenario file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
