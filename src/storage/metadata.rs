//! `metadata.json`: the per-meeting record the query layer and the change
//! detection read back.

use crate::api::{models::meeting_date, MeetingSummary, Participants};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;

pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingMetadata {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub people: Option<Value>,
    #[serde(default)]
    pub calendar_event: Option<Value>,
    /// SHA-256 of the raw document, only kept when the API has no `updated_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl MeetingMetadata {
    pub fn from_summary(summary: &MeetingSummary) -> Self {
        let fingerprint = match summary.updated_at {
            Some(_) => None,
            None => Some(fingerprint(summary.raw())),
        };
        Self {
            id: summary.id.clone(),
            title: summary.title.clone(),
            created_at: summary.created_at.clone(),
            updated_at: summary.updated_at.clone(),
            people: summary.people.clone(),
            calendar_event: summary.calendar_event.clone(),
            fingerprint,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn date(&self) -> Option<NaiveDate> {
        meeting_date(self.created_at.as_deref())
    }

    /// `YYYY-MM-DD` prefix of `created_at`, empty when unknown.
    pub fn date_str(&self) -> &str {
        self.created_at
            .as_deref()
            .and_then(|c| c.get(..10))
            .unwrap_or("")
    }

    pub fn participants(&self) -> Participants {
        Participants::from_people(self.people.as_ref())
    }
}

/// Hex SHA-256 of a JSON document. Object keys serialize in sorted order, so
/// the same document always hashes the same.
pub fn fingerprint(raw: &Value) -> String {
    let bytes = serde_json::to_vec(raw).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Read `metadata.json` from a meeting folder. Missing or corrupt → `None`.
pub fn load_metadata(meeting_dir: &Path) -> Option<MeetingMetadata> {
    let path = meeting_dir.join(METADATA_FILE);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!("Ignoring corrupt {}: {}", path.display(), e);
            None
        }
    }
}
