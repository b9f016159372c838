//! Storage module - the on-disk meeting folder tree.
//!
//! One folder per meeting, named `{date}_{title}`, holding:
//! - `metadata.json` (id, title, timestamps, participants, calendar event)
//! - `transcript.md` (rendered transcript)
//! - `transcript.json` (raw transcript payload)
//! - `document.json` (full API response)
//! - `notes.md` (AI notes, when the meeting has them)
//!
//! This layout is read by other tools and must stay stable.

pub mod layout;
pub mod metadata;
pub mod store;

pub use metadata::{MeetingMetadata, METADATA_FILE};
pub use store::{
    CachedMeeting, MeetingStore, DOCUMENT_FILE, NOTES_FILE, TRANSCRIPT_JSON_FILE,
    TRANSCRIPT_MD_FILE,
};
