//! Change detection between a remote meeting and its cached copy.
//!
//! The signal is the server's `updated_at` string, compared as-is with the one
//! recorded in `metadata.json`. Documents without `updated_at` fall back to a
//! SHA-256 fingerprint of the raw document.

use crate::api::MeetingSummary;
use crate::storage::metadata::{fingerprint, MeetingMetadata};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    UpdatedAt(String),
    Fingerprint(String),
}

impl ChangeSignal {
    pub fn remote(meeting: &MeetingSummary) -> Self {
        match &meeting.updated_at {
            Some(updated_at) => Self::UpdatedAt(updated_at.clone()),
            None => Self::Fingerprint(fingerprint(meeting.raw())),
        }
    }

    pub fn local(metadata: &MeetingMetadata) -> Option<Self> {
        metadata
            .updated_at
            .clone()
            .map(Self::UpdatedAt)
            .or_else(|| metadata.fingerprint.clone().map(Self::Fingerprint))
    }
}

/// How a remote meeting relates to the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// No local folder
    New,
    /// Local copy is stale (or `--force`)
    Changed,
    /// Local copy matches
    Unchanged,
}

pub fn classify(
    meeting: &MeetingSummary,
    cached: Option<&MeetingMetadata>,
    force: bool,
) -> Classification {
    let Some(cached) = cached else {
        return Classification::New;
    };
    if force {
        return Classification::Changed;
    }
    match ChangeSignal::local(cached) {
        Some(local) if local == ChangeSignal::remote(meeting) => Classification::Unchanged,
        _ => Classification::Changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(raw: serde_json::Value) -> MeetingSummary {
        MeetingSummary::from_value(raw).unwrap()
    }

    #[test]
    fn test_new_without_cache() {
        let m = summary(json!({"id": "a", "updated_at": "t1"}));
        assert_eq!(classify(&m, None, false), Classification::New);
        assert_eq!(classify(&m, None, true), Classification::New);
    }

    #[test]
    fn test_updated_at_comparison() {
        let m = summary(json!({"id": "a", "updated_at": "t1"}));
        let cached = MeetingMetadata::from_summary(&m);
        assert_eq!(classify(&m, Some(&cached), false), Classification::Unchanged);
        assert_eq!(classify(&m, Some(&cached), true), Classification::Changed);

        let edited = summary(json!({"id": "a", "updated_at": "t2"}));
        assert_eq!(classify(&edited, Some(&cached), false), Classification::Changed);
    }

    #[test]
    fn test_fingerprint_fallback() {
        let m = summary(json!({"id": "a", "title": "Plan"}));
        let cached = MeetingMetadata::from_summary(&m);
        assert_eq!(classify(&m, Some(&cached), false), Classification::Unchanged);

        let retitled = summary(json!({"id": "a", "title": "Plan v2"}));
        assert_eq!(classify(&retitled, Some(&cached), false), Classification::Changed);
    }

    #[test]
    fn test_metadata_without_any_signal_is_stale() {
        let m = summary(json!({"id": "a", "updated_at": "t1"}));
        let mut cached = MeetingMetadata::from_summary(&m);
        cached.updated_at = None;
        assert_eq!(classify(&m, Some(&cached), false), Classification::Changed);
    }
}
