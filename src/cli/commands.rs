//! Command implementations for the granola CLI.
//!
//! - sync: pull new and changed meetings into the storage folder
//! - list / show / search: read-only JSON views over the storage folder
//! - get: copy meetings out, fetching the ones not cached

use anyhow::{Context, Result};
use colored::Colorize;
use granola_sync::api::{GranolaClient, MeetingSource};
use granola_sync::auth::load_token;
use granola_sync::config::{resolve_storage_from_env, Config, StorageRoot};
use granola_sync::query::{self, CompactMeeting, ListFilter};
use granola_sync::storage::MeetingStore;
use granola_sync::sync::{Classification, MeetingOutcome, SyncEngine, SyncEvent, SyncOptions};
use granola_sync::GranolaError;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global flags shared by every command.
pub struct AppContext {
    pub config: Config,
    pub storage: StorageRoot,
    pub pretty: bool,
}

impl AppContext {
    pub fn load(storage_flag: Option<&Path>, pretty: bool) -> Result<Self> {
        let config = Config::load_default()?;
        let storage = resolve_storage_from_env(storage_flag, &config)?;
        Ok(Self {
            config,
            storage,
            pretty,
        })
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .context("Cannot serialize output")?;
        println!("{}", out);
        Ok(())
    }

    fn open_store(&self) -> Result<MeetingStore> {
        Ok(MeetingStore::open(&self.storage.path)?)
    }
}

// ============ SYNC COMMAND ============

pub struct SyncArgs {
    pub force: bool,
    pub since: Option<String>,
    pub limit: Option<usize>,
    pub quiet: bool,
    pub json: bool,
}

/// Returns `false` when some meetings failed.
pub fn sync(ctx: &AppContext, args: SyncArgs) -> Result<bool> {
    let options = SyncOptions {
        force: args.force,
        since: args.since.as_deref().map(query::parse_date_local).transpose()?,
        limit: args.limit,
    };

    let token = load_token()?;
    let client = GranolaClient::new(token, &ctx.config)?;
    let mut store = MeetingStore::create(&ctx.storage.path)?;

    if !args.quiet && !args.json {
        eprintln!(
            "{} {}",
            "Syncing meetings into".cyan(),
            ctx.storage.path.display().to_string().bold()
        );
    }

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let report = {
        let mut engine = SyncEngine::new(&client, &mut store);
        let result = engine.run(&options, |event| report_event(&pb, event));
        pb.finish_and_clear();
        result?
    };

    if args.json {
        ctx.print_json(&report)?;
    } else {
        println!(
            "{} {} written, {} skipped, {} failed ({} total)",
            "Sync finished:".green().bold(),
            report.written.to_string().green(),
            report.skipped,
            report.failed.to_string().red(),
            report.total
        );
        println!("  Storage: {}", report.storage.display().to_string().dimmed());
        for failure in &report.failures {
            println!(
                "  {} {} ({}): {}",
                "✗".red(),
                failure.title,
                failure.id.dimmed(),
                failure.error
            );
        }
        if let Some(error) = &report.listing_error {
            println!("  {} Meeting list ended early: {}", "!".yellow(), error);
        }
    }

    Ok(report.is_success())
}

fn report_event(pb: &ProgressBar, event: &SyncEvent<'_>) {
    pb.set_message(format!("{} meetings checked", event.index));

    let title = event.meeting.display_title();
    let date = event
        .meeting
        .date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown-date".to_string());

    match event.outcome {
        MeetingOutcome::Written { kind, .. } => {
            let label = match kind {
                Classification::New => "new",
                Classification::Changed => "updated",
                Classification::Unchanged => "unchanged",
            };
            pb.println(format!("  {} {} {} ({})", "✓".green(), date.dimmed(), title, label));
        }
        MeetingOutcome::Skipped => {}
        MeetingOutcome::Failed { error } => {
            pb.println(format!("  {} {} {}: {}", "✗".red(), date.dimmed(), title, error.red()));
        }
    }
}

// ============ QUERY COMMANDS ============

pub struct ListArgs {
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub title: Option<String>,
    pub participant: Option<String>,
    pub compact: bool,
}

pub fn list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let parse = |expr: Option<String>| expr.as_deref().map(query::parse_date_local).transpose();

    let mut filter = ListFilter {
        on: parse(args.date)?,
        start: parse(args.start)?,
        end: parse(args.end)?,
        title: None,
        participant: args.participant,
    };
    if let Some(pattern) = args.title.as_deref() {
        filter = filter.with_title(pattern)?;
    }

    let store = ctx.open_store()?;
    let cached = store.meetings();
    let found = filter.apply(cached.iter().map(|c| &c.metadata));

    if args.compact {
        let rows: Vec<CompactMeeting> = found.into_iter().map(CompactMeeting::from).collect();
        ctx.print_json(&rows)
    } else {
        ctx.print_json(&found)
    }
}

pub fn show(ctx: &AppContext, id: &str, transcript: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let result = query::show(&store, id, transcript)?;
    ctx.print_json(&result)
}

pub fn search(ctx: &AppContext, pattern: &str, context: usize) -> Result<()> {
    let store = ctx.open_store()?;
    let results = query::search(&store, pattern, context)?;
    ctx.print_json(&results)
}

// ============ GET COMMAND ============

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GetResult {
    Copied {
        id: String,
        source: &'static str,
        path: PathBuf,
    },
    Failed {
        id: String,
        error: String,
    },
}

/// Returns `false` when some ids could not be resolved.
pub fn get(ctx: &AppContext, ids: &[String], output: &Path) -> Result<bool> {
    let results = resolve_ids(ctx, ids, output)?;
    ctx.print_json(&results)?;
    Ok(results.iter().all(|r| matches!(r, GetResult::Copied { .. })))
}

/// One result per id. Only an auth failure aborts.
fn resolve_ids(ctx: &AppContext, ids: &[String], output: &Path) -> Result<Vec<GetResult>> {
    let store = ctx.open_store()?;
    let mut exported = MeetingStore::create(output)
        .with_context(|| format!("Cannot prepare output folder {}", output.display()))?;
    let mut client: Option<GranolaClient> = None;
    let mut results = Vec::with_capacity(ids.len());

    for id in ids {
        if let Some(cached) = store.find(id) {
            let result = match store.export(cached, output) {
                Ok(path) => {
                    tracing::debug!(id = %id, path = %path.display(), "copied from storage");
                    GetResult::Copied {
                        id: cached.folder_name(),
                        source: "storage",
                        path,
                    }
                }
                Err(e) => GetResult::Failed {
                    id: id.clone(),
                    error: e.full_message(),
                },
            };
            results.push(result);
            continue;
        }

        // The token is only needed once something has to come from the API.
        let api = match client.take() {
            Some(api) => api,
            None => GranolaClient::new(load_token()?, &ctx.config)?,
        };
        let fetched = api.get_meeting(id).and_then(|detail| {
            let folder = exported.folder_for(&detail.summary);
            exported.write(&detail, &folder)?;
            Ok((detail.summary.id, folder))
        });
        client = Some(api);

        match fetched {
            Ok((document_id, path)) => results.push(GetResult::Copied {
                id: document_id,
                source: "api",
                path,
            }),
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(GranolaError::NotFound(_)) => results.push(GetResult::Failed {
                id: id.clone(),
                error: "Not found".to_string(),
            }),
            Err(e) => results.push(GetResult::Failed {
                id: id.clone(),
                error: e.full_message(),
            }),
        }
    }

    Ok(results)
}
