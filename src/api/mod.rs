//! API module - remote meeting records and how to fetch them.
//!
//! This module contains:
//! - Meeting record types (summary, detail, transcript segments, participants)
//! - Lazy pagination over the document list
//! - The blocking HTTP client for the Granola API

pub mod client;
pub mod models;
pub mod pagination;

pub use client::GranolaClient;
pub use models::{MeetingDetail, MeetingSummary, Participants, TranscriptSegment};

use crate::error::{GranolaError, Result};
use chrono::NaiveDate;

/// A source of remote meetings. The sync engine only talks to this trait.
pub trait MeetingSource {
    /// Every remote meeting, fetched lazily. Each call starts from the top.
    fn meetings(&self) -> Box<dyn Iterator<Item = Result<MeetingSummary>> + '_>;

    /// Fetch what the list doesn't carry (the transcript).
    fn fetch_detail(&self, summary: &MeetingSummary) -> Result<MeetingDetail>;

    /// Meetings dated on or after `since`. Undated meetings are dropped when
    /// `since` is set; errors pass through.
    fn list_meetings(
        &self,
        since: Option<NaiveDate>,
    ) -> Box<dyn Iterator<Item = Result<MeetingSummary>> + '_> {
        let all = self.meetings();
        match since {
            None => all,
            Some(since) => Box::new(all.filter(move |item| match item {
                Ok(meeting) => meeting.date().is_some_and(|date| date >= since),
                Err(_) => true,
            })),
        }
    }

    /// Resolve `id` (exact, else a unique prefix) and fetch its detail.
    fn get_meeting(&self, id: &str) -> Result<MeetingDetail> {
        let summary = self.find_meeting(id)?;
        self.fetch_detail(&summary)
    }

    /// Resolve `id` against the remote list: exact match, else a unique prefix.
    fn find_meeting(&self, id: &str) -> Result<MeetingSummary> {
        let mut prefixed = Vec::new();
        for item in self.meetings() {
            let meeting = item?;
            if meeting.id == id {
                return Ok(meeting);
            }
            if meeting.id.starts_with(id) {
                prefixed.push(meeting);
            }
        }

        match prefixed.len() {
            0 => Err(GranolaError::NotFound(format!("Meeting not found: {}", id))),
            1 => Ok(prefixed.remove(0)),
            n => Err(GranolaError::InvalidArgument(format!(
                "Meeting id prefix '{}' is ambiguous ({} matches)",
                id, n
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticSource(Vec<MeetingSummary>);

    impl MeetingSource for StaticSource {
        fn meetings(&self) -> Box<dyn Iterator<Item = Result<MeetingSummary>> + '_> {
            Box::new(self.0.iter().cloned().map(Ok))
        }

        fn fetch_detail(&self, summary: &MeetingSummary) -> Result<MeetingDetail> {
            Ok(MeetingDetail::new(summary.clone(), Vec::new()))
        }
    }

    fn meeting(id: &str, created_at: Option<&str>) -> MeetingSummary {
        MeetingSummary::from_value(json!({"id": id, "created_at": created_at})).unwrap()
    }

    fn source() -> StaticSource {
        StaticSource(vec![
            meeting("aaa111", Some("2025-01-20T10:00:00Z")),
            meeting("aaa222", Some("2025-01-10T10:00:00Z")),
            meeting("bbb333", None),
        ])
    }

    #[test]
    fn test_since_filter() {
        let since = NaiveDate::from_ymd_opt(2025, 1, 15);
        let ids: Vec<_> = source()
            .list_meetings(since)
            .map(|m| m.unwrap().id)
            .collect();
        assert_eq!(ids, vec!["aaa111"]);

        assert_eq!(source().list_meetings(None).count(), 3);
    }

    #[test]
    fn test_find_meeting_by_prefix() {
        let source = source();
        assert_eq!(source.find_meeting("bbb").unwrap().id, "bbb333");
        assert_eq!(source.get_meeting("aaa222").unwrap().summary.id, "aaa222");
        assert!(matches!(
            source.find_meeting("aaa"),
            Err(GranolaError::InvalidArgument(_))
        ));
        assert!(matches!(
            source.find_meeting("zzz"),
            Err(GranolaError::NotFound(_))
        ));
    }
}
