//! Meeting records as returned by the Granola API.
//!
//! Only the fields this tool reads are typed. The complete JSON object is kept
//! alongside so it can be written back verbatim as `document.json`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Typed view of the fields we use from a document.
#[derive(Debug, Deserialize)]
struct DocumentFields {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    people: Option<Value>,
    #[serde(default)]
    google_calendar_event: Option<Value>,
    #[serde(default)]
    notes_markdown: Option<String>,
    #[serde(default)]
    notes_plain: Option<String>,
    #[serde(default)]
    transcript: Option<Value>,
    #[serde(default)]
    chapters: Option<Value>,
}

/// One entry of the remote document list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSummary {
    pub id: String,
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Creator and attendees, either an object or a list depending on the API version
    pub people: Option<Value>,
    pub calendar_event: Option<Value>,
    pub notes_markdown: Option<String>,
    pub notes_plain: Option<String>,
    /// Transcript embedded in the document (older API responses)
    pub transcript: Option<Value>,
    /// Chapter-based transcript embedded in the document
    pub chapters: Option<Value>,
    raw: Value,
}

impl MeetingSummary {
    /// Build a summary from a raw API document.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let fields = DocumentFields::deserialize(&raw)?;
        Ok(Self {
            id: fields.id,
            title: fields.title,
            created_at: fields.created_at,
            updated_at: fields.updated_at,
            people: fields.people,
            calendar_event: fields.google_calendar_event,
            notes_markdown: fields.notes_markdown,
            notes_plain: fields.notes_plain,
            transcript: fields.transcript,
            chapters: fields.chapters,
            raw,
        })
    }

    /// The full API object.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Untitled")
    }

    pub fn date(&self) -> Option<NaiveDate> {
        meeting_date(self.created_at.as_deref())
    }

    /// AI-generated notes: Markdown when present, plain text otherwise.
    pub fn notes(&self) -> Option<&str> {
        self.notes_markdown
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.notes_plain.as_deref().filter(|n| !n.trim().is_empty()))
    }
}

/// One transcript segment. Fields we don't read are kept for `transcript.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// `microphone` (the creator) or `system` (everyone else)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Missing and `null` text both read as an empty string.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A meeting with its transcript fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDetail {
    pub summary: MeetingSummary,
    pub transcript: Vec<TranscriptSegment>,
}

impl MeetingDetail {
    pub fn new(summary: MeetingSummary, transcript: Vec<TranscriptSegment>) -> Self {
        Self {
            summary,
            transcript,
        }
    }

    /// Raw transcript payload: fetched segments, else the embedded
    /// transcript, else chapters, else an empty list.
    pub fn raw_transcript(&self) -> Value {
        if !self.transcript.is_empty() {
            return serde_json::to_value(&self.transcript).unwrap_or(Value::Array(Vec::new()));
        }
        [&self.summary.transcript, &self.summary.chapters]
            .into_iter()
            .flatten()
            .find(|v| is_present(v))
            .cloned()
            .unwrap_or(Value::Array(Vec::new()))
    }
}

/// Null, empty string, empty list and empty object count as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

/// Date of a meeting from its `created_at` timestamp (`YYYY-MM-DD...`).
pub fn meeting_date(created_at: Option<&str>) -> Option<NaiveDate> {
    let prefix = created_at?.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Participants of a meeting, extracted from its `people` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants {
    /// Display name of the meeting creator ("Me" when unknown)
    pub creator_name: String,
    /// Display names, creator first
    pub names: Vec<String>,
    /// Every name and email found
    pub identifiers: Vec<String>,
}

impl Participants {
    pub fn from_people(people: Option<&Value>) -> Self {
        let mut participants = Self {
            creator_name: "Me".to_string(),
            names: Vec::new(),
            identifiers: Vec::new(),
        };

        match people {
            Some(Value::Object(obj)) => {
                if let Some(creator) = obj.get("creator").and_then(Value::as_object) {
                    if let Some(name) = non_empty_str(creator.get("name")) {
                        participants.creator_name = name.to_string();
                        participants.names.push(name.to_string());
                    }
                    participants.push_identifiers(creator);
                }
                let attendees = obj.get("attendees").and_then(Value::as_array);
                for attendee in attendees.into_iter().flatten() {
                    match attendee {
                        Value::Object(att) => {
                            if let Some(name) = non_empty_str(att.get("name")) {
                                participants.names.push(name.to_string());
                            }
                            participants.push_identifiers(att);
                        }
                        Value::String(s) if !s.is_empty() => {
                            participants.names.push(s.clone());
                            participants.identifiers.push(s.clone());
                        }
                        _ => {}
                    }
                }
            }
            Some(Value::Array(list)) => {
                for person in list.iter().filter_map(Value::as_object) {
                    let display = non_empty_str(person.get("name"))
                        .or_else(|| non_empty_str(person.get("email")))
                        .unwrap_or("Unknown");
                    participants.names.push(display.to_string());
                    participants.push_identifiers(person);
                }
            }
            _ => {}
        }

        participants
    }

    fn push_identifiers(&mut self, person: &Map<String, Value>) {
        for field in ["name", "email"] {
            if let Some(value) = non_empty_str(person.get(field)) {
                self.identifiers.push(value.to_string());
            }
        }
    }

    /// Case-insensitive substring match against any name or email.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.identifiers
            .iter()
            .any(|ident| ident.to_lowercase().contains(&query))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
