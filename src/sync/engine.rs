//! Incremental sync of remote meetings into the storage tree.
//!
//! Each remote meeting is classified against the cache. New and changed
//! meetings are fetched and written; unchanged ones cost nothing beyond the
//! list entry. One meeting failing does not stop the others.

use super::signal::{classify, Classification};
use crate::api::{MeetingSource, MeetingSummary};
use crate::error::{GranolaError, Result};
use crate::storage::MeetingStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// Options for one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Treat every cached meeting as changed
    pub force: bool,
    /// Only meetings dated on or after this day
    pub since: Option<NaiveDate>,
    /// Stop after this many meetings
    pub limit: Option<usize>,
}

/// What happened to one meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MeetingOutcome {
    Written {
        kind: Classification,
        folder: PathBuf,
    },
    Skipped,
    Failed {
        error: String,
    },
}

/// Progress notification, one per meeting.
#[derive(Debug)]
pub struct SyncEvent<'a> {
    /// 1-based position in the scan
    pub index: usize,
    pub meeting: &'a MeetingSummary,
    pub outcome: &'a MeetingOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub id: String,
    pub title: String,
    pub error: String,
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
    pub storage: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SyncFailure>,
    /// The remote list broke off partway through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_error: Option<String>,
}

impl SyncReport {
    fn new(storage: PathBuf) -> Self {
        Self {
            written: 0,
            skipped: 0,
            failed: 0,
            total: 0,
            storage,
            failures: Vec::new(),
            listing_error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.listing_error.is_none()
    }
}

pub struct SyncEngine<'a, S: MeetingSource + ?Sized> {
    source: &'a S,
    store: &'a mut MeetingStore,
}

impl<'a, S: MeetingSource + ?Sized> SyncEngine<'a, S> {
    pub fn new(source: &'a S, store: &'a mut MeetingStore) -> Self {
        Self { source, store }
    }

    /// Run one sync pass, reporting each meeting to `on_event`.
    ///
    /// Returns `Err` only for failures that make the rest of the run
    /// pointless: an auth failure, or the list failing before the first
    /// meeting.
    pub fn run<F>(&mut self, options: &SyncOptions, mut on_event: F) -> Result<SyncReport>
    where
        F: FnMut(&SyncEvent<'_>),
    {
        let source = self.source;
        let mut report = SyncReport::new(self.store.root().to_path_buf());
        let meetings = source
            .list_meetings(options.since)
            .take(options.limit.unwrap_or(usize::MAX));

        for item in meetings {
            let meeting = match item {
                Ok(meeting) => meeting,
                Err(e) if e.is_auth() || report.total == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!("Meeting list ended early: {}", e);
                    report.listing_error = Some(e.to_string());
                    break;
                }
            };

            report.total += 1;
            let outcome = self.sync_meeting(&meeting, options.force)?;
            match &outcome {
                MeetingOutcome::Written { .. } => report.written += 1,
                MeetingOutcome::Skipped => report.skipped += 1,
                MeetingOutcome::Failed { error } => {
                    report.failed += 1;
                    report.failures.push(SyncFailure {
                        id: meeting.id.clone(),
                        title: meeting.display_title().to_string(),
                        error: error.clone(),
                    });
                }
            }

            on_event(&SyncEvent {
                index: report.total,
                meeting: &meeting,
                outcome: &outcome,
            });
        }

        tracing::info!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            "sync finished"
        );
        Ok(report)
    }

    fn sync_meeting(&mut self, meeting: &MeetingSummary, force: bool) -> Result<MeetingOutcome> {
        let cached = self.store.get(&meeting.id).map(|c| &c.metadata);
        let kind = classify(meeting, cached, force);
        tracing::debug!(id = %meeting.id, ?kind, "classified");

        if kind == Classification::Unchanged {
            return Ok(MeetingOutcome::Skipped);
        }

        let detail = match self.source.fetch_detail(meeting) {
            Ok(detail) => detail,
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => return Ok(failed(meeting, e)),
        };

        let folder = self.store.folder_for(meeting);
        match self.store.write(&detail, &folder) {
            Ok(()) => Ok(MeetingOutcome::Written { kind, folder }),
            Err(e) => Ok(failed(meeting, e)),
        }
    }
}

fn failed(meeting: &MeetingSummary, error: GranolaError) -> MeetingOutcome {
    tracing::warn!("Failed to sync {}: {}", meeting.id, error);
    MeetingOutcome::Failed {
        error: error.full_message(),
    }
}
