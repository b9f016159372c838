//! The meeting folder tree: index of cached meetings and artifact writes.

use super::layout::{folder_name, suffixed_folder_name};
use super::metadata::{load_metadata, MeetingMetadata, METADATA_FILE};
use crate::api::{MeetingDetail, MeetingSummary};
use crate::error::{GranolaError, Result};
use crate::formatters::{Formatter, MarkdownFormatter};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const TRANSCRIPT_MD_FILE: &str = "transcript.md";
pub const TRANSCRIPT_JSON_FILE: &str = "transcript.json";
pub const DOCUMENT_FILE: &str = "document.json";
pub const NOTES_FILE: &str = "notes.md";

/// A meeting folder that has a readable `metadata.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMeeting {
    pub dir: PathBuf,
    pub metadata: MeetingMetadata,
}

impl CachedMeeting {
    pub fn folder_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Storage root plus an in-memory index of what it holds.
pub struct MeetingStore {
    root: PathBuf,
    by_id: HashMap<String, CachedMeeting>,
    /// Folders left without metadata by an interrupted write, by document id
    partial: HashMap<String, PathBuf>,
    /// Folders handed out by `folder_for` during this run
    reserved: HashSet<PathBuf>,
}

impl MeetingStore {
    /// Index an existing storage root. A missing root is an empty store.
    pub fn open(root: &Path) -> Result<Self> {
        let mut store = Self {
            root: root.to_path_buf(),
            by_id: HashMap::new(),
            partial: HashMap::new(),
            reserved: HashSet::new(),
        };

        if !root.exists() {
            return Ok(store);
        }

        let entries = fs::read_dir(root).map_err(|e| {
            GranolaError::Config(format!("Cannot read storage {}: {}", root.display(), e))
        })?;
        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            match load_metadata(&dir) {
                Some(metadata) => {
                    if let Some(existing) = store.by_id.get(&metadata.id) {
                        tracing::warn!(
                            "Meeting {} cached twice ({} and {}); using the first",
                            metadata.id,
                            existing.dir.display(),
                            dir.display()
                        );
                        continue;
                    }
                    store
                        .by_id
                        .insert(metadata.id.clone(), CachedMeeting { dir, metadata });
                }
                None => {
                    if let Some(id) = document_id(&dir) {
                        store.partial.entry(id).or_insert(dir);
                    }
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            cached = store.by_id.len(),
            partial = store.partial.len(),
            "indexed storage"
        );
        Ok(store)
    }

    /// Create the root if needed, then index it.
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).map_err(|e| GranolaError::storage(root, e))?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CachedMeeting> {
        self.by_id.get(id)
    }

    /// Folder for a meeting.
    ///
    /// A known id keeps its folder. A new id gets `{date}_{title}`, or
    /// `{date}_{title}_{id[..8]}` when that folder is already taken on disk or
    /// earlier in this run. A folder holding neither `metadata.json` nor
    /// `document.json` is not taken.
    pub fn folder_for(&mut self, meeting: &MeetingSummary) -> PathBuf {
        if let Some(cached) = self.by_id.get(&meeting.id) {
            return cached.dir.clone();
        }
        if let Some(dir) = self.partial.get(&meeting.id) {
            return dir.clone();
        }

        let candidates = [
            folder_name(meeting),
            suffixed_folder_name(meeting),
            format!("{}_{}", folder_name(meeting), meeting.id),
        ];
        let dir = candidates
            .iter()
            .map(|name| self.root.join(name))
            .find(|dir| !self.reserved.contains(dir) && is_free(dir))
            .unwrap_or_else(|| self.root.join(&candidates[2]));

        self.reserved.insert(dir.clone());
        dir
    }

    /// Write every artifact of `meeting` into `folder`.
    ///
    /// `document.json` goes first, so an interrupted folder can be matched
    /// back to its id. `metadata.json` goes last, so the previous change
    /// signal survives and the meeting is fetched again next time.
    pub fn write(&mut self, meeting: &MeetingDetail, folder: &Path) -> Result<()> {
        fs::create_dir_all(folder).map_err(|e| GranolaError::storage(folder, e))?;
        write_json(&folder.join(DOCUMENT_FILE), meeting.summary.raw())?;

        let formatter = MarkdownFormatter::new();
        write_atomic(
            &folder.join(formatter.file_name()),
            formatter.format(meeting).as_bytes(),
        )?;
        write_json(&folder.join(TRANSCRIPT_JSON_FILE), &meeting.raw_transcript())?;

        let notes_path = folder.join(NOTES_FILE);
        match meeting.summary.notes() {
            Some(notes) => write_atomic(&notes_path, notes.as_bytes())?,
            None if notes_path.exists() => {
                fs::remove_file(&notes_path).map_err(|e| GranolaError::storage(&notes_path, e))?
            }
            None => {}
        }

        let metadata = MeetingMetadata::from_summary(&meeting.summary);
        write_json(&folder.join(METADATA_FILE), &metadata)?;

        self.partial.remove(&metadata.id);
        self.by_id.insert(
            metadata.id.clone(),
            CachedMeeting {
                dir: folder.to_path_buf(),
                metadata,
            },
        );
        Ok(())
    }

    /// Look up a cached meeting by id, folder name, or a fragment of either.
    ///
    /// Order: exact id, exact folder name, folder name containing `query`,
    /// id starting with `query`. Ties resolve by folder name.
    pub fn find(&self, query: &str) -> Option<&CachedMeeting> {
        if query.is_empty() {
            return None;
        }
        if let Some(cached) = self.by_id.get(query) {
            return Some(cached);
        }

        let mut all: Vec<&CachedMeeting> = self.by_id.values().collect();
        all.sort_by_key(|c| c.folder_name());

        all.iter()
            .find(|c| c.folder_name() == query)
            .or_else(|| all.iter().find(|c| c.folder_name().contains(query)))
            .or_else(|| all.iter().find(|c| c.metadata.id.starts_with(query)))
            .copied()
    }

    /// All cached meetings, newest first.
    pub fn meetings(&self) -> Vec<&CachedMeeting> {
        let mut all: Vec<&CachedMeeting> = self.by_id.values().collect();
        all.sort_by(|a, b| {
            b.metadata
                .created_at
                .cmp(&a.metadata.created_at)
                .then_with(|| a.folder_name().cmp(&b.folder_name()))
        });
        all
    }

    /// Copy a cached meeting folder into `output`, replacing an older copy.
    ///
    /// Exporting a folder onto itself leaves it untouched.
    pub fn export(&self, meeting: &CachedMeeting, output: &Path) -> Result<PathBuf> {
        let dest = output.join(meeting.folder_name());
        if same_path(&dest, &meeting.dir) {
            tracing::debug!(path = %dest.display(), "export target is the cached folder");
            return Ok(dest);
        }
        if dest.exists() {
            fs::remove_dir_all(&dest).map_err(|e| GranolaError::storage(&dest, e))?;
        }
        fs::create_dir_all(&dest).map_err(|e| GranolaError::storage(&dest, e))?;

        let entries = fs::read_dir(&meeting.dir).map_err(|e| GranolaError::storage(&meeting.dir, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let target = dest.join(entry.file_name());
            fs::copy(&path, &target).map_err(|e| GranolaError::storage(&target, e))?;
        }
        Ok(dest)
    }
}

/// Nothing there, or a folder no meeting claims.
fn is_free(dir: &Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.is_dir() && !dir.join(METADATA_FILE).exists() && !dir.join(DOCUMENT_FILE).exists()
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// `id` from `document.json`, used to recognise interrupted writes.
fn document_id(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join(DOCUMENT_FILE)).ok()?;
    let doc: Value = serde_json::from_str(&content).ok()?;
    doc.get("id").and_then(Value::as_str).map(str::to_string)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let payload = serde_json::to_vec_pretty(value).map_err(|e| {
        GranolaError::storage(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    write_atomic(path, &payload)
}

/// Write to a temporary sibling, then rename over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp_path, contents).map_err(|e| GranolaError::storage(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        GranolaError::storage(path, e)
    })
}
