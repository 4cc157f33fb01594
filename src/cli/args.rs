// src/cli/args.rs
use crate::infrastructure::Backend;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Configuration file (default: <config dir>/ankisync/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Where notes are pushed to (overrides the config file)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<Backend>,

    /// AnkiConnect endpoint (overrides the config file)
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Path to Anki collection file, for the collection backend
    #[arg(short, long, value_name = "COLLECTION", global = true)]
    pub collection: Option<PathBuf>,

    /// Profile name, for the collection backend
    #[arg(short, long, value_name = "PROFILE", global = true)]
    pub profile: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (sync or check)
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create or update notes in Anki from note files
    Sync {
        /// Directory to search for note files, or a single note file
        #[arg(value_name = "ROOT")]
        root: PathBuf,
    },

    /// Parse note files and report problems without touching Anki
    Check {
        /// Directory to search for note files, or a single note file
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Print parsed notes as JSON
        #[arg(long)]
        json: bool,
    },
}
