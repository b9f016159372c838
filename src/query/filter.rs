//! `list` filters over cached metadata.

use crate::error::{GranolaError, Result};
use crate::storage::MeetingMetadata;
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Predicates for `list`. Every set predicate must hold.
#[derive(Debug, Default)]
pub struct ListFilter {
    pub on: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub title: Option<Regex>,
    pub participant: Option<String>,
}

impl ListFilter {
    /// Compile a case-insensitive title pattern.
    pub fn with_title(mut self, pattern: &str) -> Result<Self> {
        self.title = Some(compile_pattern(pattern)?);
        Ok(self)
    }

    pub fn matches(&self, meeting: &MeetingMetadata) -> bool {
        let date = meeting.date();
        let date_ok = |predicate: Option<NaiveDate>, check: fn(NaiveDate, NaiveDate) -> bool| {
            match (predicate, date) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(bound), Some(date)) => check(date, bound),
            }
        };

        if !date_ok(self.on, |d, b| d == b)
            || !date_ok(self.start, |d, b| d >= b)
            || !date_ok(self.end, |d, b| d <= b)
        {
            return false;
        }

        if let Some(title) = &self.title {
            if !title.is_match(meeting.title.as_deref().unwrap_or("")) {
                return false;
            }
        }

        if let Some(participant) = &self.participant {
            if !meeting.participants().matches(participant) {
                return false;
            }
        }

        true
    }

    pub fn apply<'a, I>(&self, meetings: I) -> Vec<&'a MeetingMetadata>
    where
        I: IntoIterator<Item = &'a MeetingMetadata>,
    {
        meetings.into_iter().filter(|m| self.matches(m)).collect()
    }
}

/// `list --compact` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactMeeting {
    pub id: String,
    pub date: String,
    pub title: String,
}

impl From<&MeetingMetadata> for CompactMeeting {
    fn from(meeting: &MeetingMetadata) -> Self {
        Self {
            id: meeting.id.clone(),
            date: meeting.date_str().to_string(),
            title: meeting.display_title().to_string(),
        }
    }
}

/// Case-insensitive regex, with a readable error for bad patterns.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| GranolaError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e)))
}
