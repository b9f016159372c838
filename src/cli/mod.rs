//! CLI definitions and command implementations for granola.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// granola - Mirror your Granola meetings into plain folders
#[derive(Parser)]
#[command(name = "granola")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Storage folder (overrides GRANOLA_SYNC_FOLDER and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub storage: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download new and changed meetings into the storage folder
    Sync {
        /// Re-download meetings even when unchanged
        #[arg(long)]
        force: bool,

        /// Only meetings on or after DATE (YYYY-MM-DD, today, last week, ...)
        #[arg(long, value_name = "DATE")]
        since: Option<String>,

        /// Process at most N meetings
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// No per-meeting progress
        #[arg(short, long)]
        quiet: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cached meetings
    List {
        /// Meetings on exactly this day
        #[arg(long, value_name = "DATE", conflicts_with_all = ["start", "end"])]
        date: Option<String>,

        /// Meetings on or after this day
        #[arg(long, value_name = "DATE")]
        start: Option<String>,

        /// Meetings on or before this day
        #[arg(long, value_name = "DATE")]
        end: Option<String>,

        /// Title regex (case-insensitive)
        #[arg(long, value_name = "REGEX")]
        title: Option<String>,

        /// Participant name or email fragment
        #[arg(long, value_name = "TEXT")]
        participant: Option<String>,

        /// Only id, date and title
        #[arg(long)]
        compact: bool,
    },

    /// Show one cached meeting
    Show {
        /// Meeting id, folder name, or a fragment of either
        id: String,

        /// Include the rendered transcript
        #[arg(long)]
        transcript: bool,
    },

    /// Regex search across cached transcripts
    Search {
        pattern: String,

        /// Lines of context around each match
        #[arg(short = 'C', long, default_value = "0", value_name = "N")]
        context: usize,
    },

    /// Copy meetings into another folder, fetching the ones not cached
    Get {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,

        /// Destination folder
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },
}
