//! Integration tests for the sync engine against an in-memory source.
//!
//! Covers idempotence, change detection, partial failure, and the
//! `--force` / `--since` / `--limit` options.

mod common;

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use common::{FakeSource, PLANNING_ID, REVIEW_ID, STANDUP_ID};
use granola_sync::storage::{
    MeetingMetadata, MeetingStore, DOCUMENT_FILE, METADATA_FILE, NOTES_FILE,
    TRANSCRIPT_JSON_FILE, TRANSCRIPT_MD_FILE,
};
use granola_sync::sync::{Classification, MeetingOutcome, SyncEngine, SyncOptions, SyncReport};
use granola_sync::GranolaError;
use tempfile::TempDir;

fn run(source: &FakeSource, root: &Path, options: &SyncOptions) -> granola_sync::Result<SyncReport> {
    let mut store = MeetingStore::create(root)?;
    SyncEngine::new(source, &mut store).run(options, |_| {})
}

fn run_default(source: &FakeSource, root: &Path) -> SyncReport {
    run(source, root, &SyncOptions::default()).expect("sync failed")
}

// ===========================================================================
// First sync and idempotence
// ===========================================================================

#[test]
fn test_first_sync_writes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();

    let report = run_default(&source, dir.path());
    assert_eq!(report.written, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.total, 3);
    assert!(report.is_success());
    assert_eq!(report.storage, dir.path());

    let standup = dir.path().join("2025-01-15_Team-Standup");
    for file in [METADATA_FILE, TRANSCRIPT_MD_FILE, TRANSCRIPT_JSON_FILE, DOCUMENT_FILE, NOTES_FILE] {
        assert!(standup.join(file).is_file(), "missing {}", file);
    }

    let metadata: MeetingMetadata =
        serde_json::from_str(&fs::read_to_string(standup.join(METADATA_FILE)).unwrap()).unwrap();
    assert_eq!(metadata.id, STANDUP_ID);
    assert_eq!(metadata.updated_at.as_deref(), Some("2025-01-15T09:40:12.000Z"));

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(standup.join(DOCUMENT_FILE)).unwrap()).unwrap();
    assert_eq!(document["workspace_id"], "ws-1");

    let markdown = fs::read_to_string(standup.join(TRANSCRIPT_MD_FILE)).unwrap();
    assert!(markdown.starts_with("# Team Standup\n"));
    assert!(markdown.contains("**Date:** 2025-01-15"));
    assert!(markdown.contains("**Ada Lovelace:** Morning everyone, quick round today."));
    assert!(markdown.contains("**Other:** I finished the export screen."));

    // Plain notes are used when the Markdown notes are empty
    let review_notes = fs::read_to_string(dir.path().join("2025-01-10_Design-Review").join(NOTES_FILE)).unwrap();
    assert!(review_notes.contains("new navigation"));

    // No notes at all: no notes.md
    assert!(!dir.path().join("2025-01-20_Budget-Planning").join(NOTES_FILE).exists());
}

#[test]
fn test_second_run_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();

    run_default(&source, dir.path());
    let fetched_after_first = source.fetch_count();

    let report = run_default(&source, dir.path());
    assert_eq!(report.written, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(source.fetch_count(), fetched_after_first, "unchanged meetings must not be fetched");
}

// ===========================================================================
// Change detection
// ===========================================================================

#[test]
fn test_only_changed_meeting_is_rewritten() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    run_default(&source, dir.path());

    source.update(REVIEW_ID, |doc| {
        doc["updated_at"] = "2025-01-11T08:00:00.000Z".into();
        doc["title"] = "Design Review (final)".into();
    });
    source.fetched.borrow_mut().clear();

    let mut store = MeetingStore::create(dir.path()).unwrap();
    let mut outcomes = Vec::new();
    let report = SyncEngine::new(&source, &mut store)
        .run(&SyncOptions::default(), |event| {
            outcomes.push((event.meeting.id.clone(), event.outcome.clone()))
        })
        .unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(*source.fetched.borrow(), vec![REVIEW_ID.to_string()]);

    // A renamed meeting stays in its original folder
    let (_, outcome) = outcomes.iter().find(|(id, _)| id == REVIEW_ID).unwrap();
    assert_eq!(
        *outcome,
        MeetingOutcome::Written {
            kind: Classification::Changed,
            folder: dir.path().join("2025-01-10_Design-Review"),
        }
    );
    assert!(!dir.path().join("2025-01-10_Design-Review-(final)").exists());
}

#[test]
fn test_stale_notes_are_removed() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    run_default(&source, dir.path());

    let notes = dir.path().join("2025-01-15_Team-Standup").join(NOTES_FILE);
    assert!(notes.exists());

    source.update(STANDUP_ID, |doc| {
        doc["notes_markdown"] = "".into();
        doc["updated_at"] = "2025-01-16T00:00:00.000Z".into();
    });
    run_default(&source, dir.path());
    assert!(!notes.exists());
}

#[test]
fn test_force_rewrites_everything() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    run_default(&source, dir.path());

    let options = SyncOptions {
        force: true,
        ..SyncOptions::default()
    };
    let report = run(&source, dir.path(), &options).unwrap();
    assert_eq!(report.written, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(source.fetch_count(), 6);

    // Still one folder per meeting
    let folders = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(folders, 3);
}

// ===========================================================================
// Failure handling
// ===========================================================================

#[test]
fn test_one_failure_does_not_stop_the_rest() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    source.fail(REVIEW_ID);

    let report = run_default(&source, dir.path());
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, REVIEW_ID);
    assert_eq!(report.failures[0].title, "Design Review");
    assert!(report.failures[0].error.contains("timed out"));

    let store = MeetingStore::open(dir.path()).unwrap();
    assert!(store.get(STANDUP_ID).is_some());
    assert!(store.get(PLANNING_ID).is_some());
    assert!(store.get(REVIEW_ID).is_none());

    // The failed meeting is picked up next time
    source.failing.borrow_mut().clear();
    let retry = run_default(&source, dir.path());
    assert_eq!(retry.written, 1);
    assert_eq!(retry.skipped, 2);
    assert!(retry.is_success());
}

#[test]
fn test_write_failure_is_recorded_and_scan_continues() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();

    // A directory squatting on transcript.md makes the review's write fail
    let review = dir.path().join("2025-01-10_Design-Review");
    let blocker = review.join(TRANSCRIPT_MD_FILE);
    fs::create_dir_all(&blocker).unwrap();

    let report = run_default(&source, dir.path());
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.is_success());
    assert_eq!(report.failures[0].id, REVIEW_ID);
    assert!(
        report.failures[0].error.contains(&blocker.display().to_string()),
        "error should name the path: {}",
        report.failures[0].error
    );

    let store = MeetingStore::open(dir.path()).unwrap();
    assert!(store.get(STANDUP_ID).is_some());
    assert!(store.get(PLANNING_ID).is_some());
    assert!(store.get(REVIEW_ID).is_none());

    // Once unblocked, the same folder is completed
    fs::remove_dir(&blocker).unwrap();
    let retry = run_default(&source, dir.path());
    assert_eq!(retry.written, 1);
    assert!(review.join(METADATA_FILE).is_file());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn test_leftover_folder_without_document_is_not_orphaned() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();

    let standup = dir.path().join("2025-01-15_Team-Standup");
    fs::create_dir_all(&standup).unwrap();
    fs::write(standup.join(TRANSCRIPT_MD_FILE), "# Team Standup\n").unwrap();

    let mut store = MeetingStore::create(dir.path()).unwrap();
    let mut folders = Vec::new();
    SyncEngine::new(&source, &mut store)
        .run(&SyncOptions::default(), |event| {
            if let MeetingOutcome::Written { folder, .. } = event.outcome {
                folders.push(folder.clone());
            }
        })
        .unwrap();

    assert!(folders.contains(&standup));
    assert!(standup.join(METADATA_FILE).is_file());
    assert!(!dir.path().join("2025-01-15_Team-Standup_doc-aaaa").exists());
}

#[test]
fn test_rejected_token_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    source.reject_auth.set(true);

    let err = run(&source, dir.path(), &SyncOptions::default()).unwrap_err();
    assert!(matches!(err, GranolaError::AuthRejected { status: 401 }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_listing_error_before_first_meeting_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    source.list_error_after.set(Some(0));

    let err = run(&source, dir.path(), &SyncOptions::default()).unwrap_err();
    assert!(matches!(err, GranolaError::Network(_)));
}

#[test]
fn test_listing_error_midway_is_reported() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    source.list_error_after.set(Some(2));

    let report = run_default(&source, dir.path());
    assert_eq!(report.total, 2);
    assert_eq!(report.written, 2);
    assert!(report.listing_error.as_deref().unwrap().contains("connection reset"));
    assert!(!report.is_success());
}

// ===========================================================================
// Options
// ===========================================================================

#[test]
fn test_since_skips_older_meetings() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    let options = SyncOptions {
        since: NaiveDate::from_ymd_opt(2025, 1, 15),
        ..SyncOptions::default()
    };

    let report = run(&source, dir.path(), &options).unwrap();
    assert_eq!(report.total, 2);
    assert!(!source.fetched.borrow().contains(&REVIEW_ID.to_string()));
}

#[test]
fn test_limit_caps_the_scan() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    let options = SyncOptions {
        limit: Some(1),
        ..SyncOptions::default()
    };

    let report = run(&source, dir.path(), &options).unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.written, 1);
    assert_eq!(*source.fetched.borrow(), vec![STANDUP_ID.to_string()]);
}

#[test]
fn test_report_json_shape() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::from_fixtures();
    let report = run_default(&source, dir.path());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["written"], 3);
    assert_eq!(json["failed"], 0);
    assert!(json.get("failures").is_none());
    assert!(json.get("listing_error").is_none());
}
