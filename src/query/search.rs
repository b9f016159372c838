//! Regex search over cached `transcript.md` files.

use super::filter::compile_pattern;
use crate::error::Result;
use crate::storage::{CachedMeeting, MeetingStore, TRANSCRIPT_MD_FILE};
use regex::Regex;
use serde::Serialize;
use std::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// 1-based line number in `transcript.md`
    pub line: usize,
    pub text: String,
    pub context: Option<String>,
}

/// All matches within one meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Folder name
    pub id: String,
    pub title: String,
    pub date: String,
    pub matches: Vec<SearchMatch>,
}

/// Search every cached transcript for `pattern`, case-insensitively.
///
/// `context` is the number of lines kept on each side of a hit. Meetings
/// without a readable transcript are skipped.
pub fn search(store: &MeetingStore, pattern: &str, context: usize) -> Result<Vec<SearchResult>> {
    let regex = compile_pattern(pattern)?;

    let mut meetings: Vec<&CachedMeeting> = store.meetings();
    meetings.sort_by_key(|c| c.folder_name());

    let mut results = Vec::new();
    for meeting in meetings {
        let path = meeting.dir.join(TRANSCRIPT_MD_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!("Skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };

        let matches = search_text(&regex, &content, context);
        if matches.is_empty() {
            continue;
        }
        results.push(SearchResult {
            id: meeting.folder_name(),
            title: meeting.metadata.display_title().to_string(),
            date: meeting.metadata.date_str().to_string(),
            matches,
        });
    }
    Ok(results)
}

fn search_text(regex: &Regex, content: &str, context: usize) -> Vec<SearchMatch> {
    let lines: Vec<&str> = content.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| regex.is_match(line))
        .map(|(i, line)| SearchMatch {
            line: i + 1,
            text: line.trim().to_string(),
            context: (context > 0).then(|| {
                let start = i.saturating_sub(context);
                let end = (i + context + 1).min(lines.len());
                lines[start..end].join("\n")
            }),
        })
        .collect()
}
