//! CLI interface for the agenda tool
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meeting agenda generator
///
/// Reads call-role sign-up sheets, keeps the member roster up to date and
/// writes timed meeting agendas.
#[derive(Parser, Debug)]
#[command(name = "agenda")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate agendas for every meeting in a call-role file
    Generate {
        /// Call-role text file
        file: PathBuf,

        /// Leave the roster untouched; write a roster snapshot next to the agenda
        #[arg(long)]
        dry_run: bool,
    },

    /// Rebuild the roster by replaying archived call-role files in name order
    Replay {
        /// Directory of `*.txt` call-roles (default: the output log directory)
        dir: Option<PathBuf>,
    },

    /// Inspect the member roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Roster inspection actions
#[derive(Subcommand, Debug)]
pub enum RosterAction {
    /// Show all members, or the member a name resolves to
    Show {
        /// Name or name prefix
        name: Option<String>,
    },

    /// Show speech and role counts per member
    Stats,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate,
}
