//! granola CLI - Mirror Granola meetings into a local folder tree
//!
//! Syncs meeting transcripts, notes and metadata from the Granola API into one
//! folder per meeting, and answers list / show / search queries from that tree.

mod cli;

use clap::Parser;
use cli::commands::{self, AppContext, ListArgs, SyncArgs};
use cli::{Cli, Commands};
use colored::Colorize;
use granola_sync::GranolaError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if !cfg!(target_os = "macos") {
        tracing::warn!("granola reads its token from the macOS Granola app; other platforms are unsupported");
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            let kind = err.chain().find_map(|e| e.downcast_ref::<GranolaError>());
            eprintln!("{} {:#}", "error:".red().bold(), err);
            if let Some(hint) = kind.and_then(GranolaError::hint) {
                eprintln!("{} {}", "hint:".yellow(), hint);
            }
            ExitCode::from(kind.map(GranolaError::exit_code).unwrap_or(1))
        }
    }
}

/// `Ok(false)` means the command finished but some items failed.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let ctx = AppContext::load(cli.storage.as_deref(), cli.pretty)?;

    match cli.command {
        Commands::Sync {
            force,
            since,
            limit,
            quiet,
            json,
        } => commands::sync(
            &ctx,
            SyncArgs {
                force,
                since,
                limit,
                quiet,
                json,
            },
        ),
        Commands::List {
            date,
            start,
            end,
            title,
            participant,
            compact,
        } => commands::list(
            &ctx,
            ListArgs {
                date,
                start,
                end,
                title,
                participant,
                compact,
            },
        )
        .map(|_| true),
        Commands::Show { id, transcript } => commands::show(&ctx, &id, transcript).map(|_| true),
        Commands::Search { pattern, context } => {
            commands::search(&ctx, &pattern, context).map(|_| true)
        }
        Commands::Get { ids, output } => commands::get(&ctx, &ids, &output),
    }
}
