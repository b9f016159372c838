//! `show`: one cached meeting's metadata, notes and optionally transcript.

use crate::error::{GranolaError, Result};
use crate::storage::{MeetingMetadata, MeetingStore, NOTES_FILE, TRANSCRIPT_MD_FILE};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowResult {
    pub metadata: MeetingMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub fn show(store: &MeetingStore, id: &str, include_transcript: bool) -> Result<ShowResult> {
    let meeting = store
        .find(id)
        .ok_or_else(|| GranolaError::NotFound(format!("Meeting '{}' not in storage", id)))?;

    let transcript = if include_transcript {
        read_optional(&meeting.dir.join(TRANSCRIPT_MD_FILE))
    } else {
        None
    };

    Ok(ShowResult {
        metadata: meeting.metadata.clone(),
        transcript,
        notes: read_optional(&meeting.dir.join(NOTES_FILE)),
    })
}

fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}
