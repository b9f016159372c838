//! Markdown Formatter
//!
//! Renders a meeting as a readable transcript with speaker attribution.
//!
//! Two transcript shapes are handled:
//! - flat segment list (transcript endpoint): speaker comes from `source`
//! - chapters (older documents): speaker comes from each segment's `speaker`

use super::Formatter;
use crate::api::{MeetingDetail, Participants, TranscriptSegment};
use serde_json::Value;

/// Markdown transcript formatter
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    fn speaker_for<'a>(segment: &'a TranscriptSegment, creator_name: &'a str) -> &'a str {
        match segment.source.as_deref() {
            Some("microphone") => creator_name,
            Some("system") => "Other",
            _ => segment.speaker.as_deref().unwrap_or("Unknown"),
        }
    }

    /// Segments embedded in the document itself, if any.
    fn embedded_segments(value: Option<&Value>) -> Vec<TranscriptSegment> {
        value
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn push_chapters(output: &mut String, chapters: &[Value]) {
        for chapter in chapters {
            if let Some(title) = chapter.get("title").and_then(Value::as_str) {
                if !title.is_empty() {
                    output.push_str(&format!("\n\n## {}\n", title));
                }
            }
            let segments = chapter.get("transcript").and_then(Value::as_array);
            for segment in segments.into_iter().flatten() {
                let speaker = segment
                    .get("speaker")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown");
                let text = segment.get("text").and_then(Value::as_str).unwrap_or("");
                output.push_str(&format!("\n**{}:** {}\n", speaker, text));
            }
        }
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for MarkdownFormatter {
    fn format(&self, meeting: &MeetingDetail) -> String {
        let summary = &meeting.summary;
        let participants = Participants::from_people(summary.people.as_ref());
        let mut output = String::new();

        // Header
        let title = summary
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled Meeting");
        output.push_str(&format!("# {}\n", title));

        let date = summary
            .created_at
            .as_deref()
            .and_then(|c| c.get(..10))
            .unwrap_or("Unknown");
        output.push_str(&format!("\n**Date:** {}\n", date));

        if !participants.names.is_empty() {
            output.push_str(&format!(
                "**Attendees:** {}\n",
                participants.names.join(", ")
            ));
        }

        output.push_str("\n---\n");

        // Body
        let segments = if meeting.transcript.is_empty() {
            Self::embedded_segments(summary.transcript.as_ref())
        } else {
            meeting.transcript.clone()
        };

        if segments.is_empty() {
            if let Some(chapters) = summary.chapters.as_ref().and_then(Value::as_array) {
                Self::push_chapters(&mut output, chapters);
            }
        } else {
            for segment in segments.iter().filter(|s| !s.text.is_empty()) {
                let speaker = Self::speaker_for(segment, &participants.creator_name);
                output.push_str(&format!("\n**{}:** {}\n", speaker, segment.text));
            }
        }

        output
    }

    fn file_name(&self) -> &'static str {
        "transcript.md"
    }
}
