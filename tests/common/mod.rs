//! Shared helpers: fixture loading and an in-memory `MeetingSource`.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use granola_sync::api::{MeetingDetail, MeetingSource, MeetingSummary, TranscriptSegment};
use granola_sync::{GranolaError, Result};
use serde_json::Value;

pub const STANDUP_ID: &str = "doc-aaaa-1111-standup";
pub const REVIEW_ID: &str = "doc-bbbb-2222-review";
pub const PLANNING_ID: &str = "doc-cccc-3333-planning";

/// Helper: get absolute path to a test fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let path = fixture_path(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Fixture file missing: {:?}: {}", path, e));
    serde_json::from_str(&content).expect("Failed to parse fixture")
}

/// Remote meetings served from memory, with knobs for failure scenarios.
pub struct FakeSource {
    pub docs: RefCell<Vec<Value>>,
    transcripts: HashMap<String, Vec<TranscriptSegment>>,
    /// Ids whose detail fetch fails with a network error
    pub failing: RefCell<HashSet<String>>,
    /// Every detail fetch rejects the token
    pub reject_auth: Cell<bool>,
    /// The list breaks with a network error after this many meetings
    pub list_error_after: Cell<Option<usize>>,
    /// Ids passed to `fetch_detail`, in order
    pub fetched: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn from_fixtures() -> Self {
        Self {
            docs: RefCell::new(load_fixture("documents.json")),
            transcripts: load_fixture("transcripts.json"),
            failing: RefCell::new(HashSet::new()),
            reject_auth: Cell::new(false),
            list_error_after: Cell::new(None),
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn fail(&self, id: &str) {
        self.failing.borrow_mut().insert(id.to_string());
    }

    /// Edit one remote document in place.
    pub fn update(&self, id: &str, edit: impl FnOnce(&mut Value)) {
        let mut docs = self.docs.borrow_mut();
        let doc = docs
            .iter_mut()
            .find(|d| d["id"] == id)
            .expect("no such fixture document");
        edit(doc);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }
}

impl MeetingSource for FakeSource {
    fn meetings(&self) -> Box<dyn Iterator<Item = Result<MeetingSummary>> + '_> {
        let mut items: Vec<Result<MeetingSummary>> = self
            .docs
            .borrow()
            .iter()
            .map(|doc| Ok(MeetingSummary::from_value(doc.clone()).expect("fixture document")))
            .collect();

        if let Some(after) = self.list_error_after.get() {
            items.truncate(after);
            items.push(Err(GranolaError::Network("connection reset".to_string())));
        }
        Box::new(items.into_iter())
    }

    fn fetch_detail(&self, summary: &MeetingSummary) -> Result<MeetingDetail> {
        self.fetched.borrow_mut().push(summary.id.clone());

        if self.reject_auth.get() {
            return Err(GranolaError::AuthRejected { status: 401 });
        }
        if self.failing.borrow().contains(&summary.id) {
            return Err(GranolaError::Network("request timed out".to_string()));
        }

        let transcript = self.transcripts.get(&summary.id).cloned().unwrap_or_default();
        Ok(MeetingDetail::new(summary.clone(), transcript))
    }
}
