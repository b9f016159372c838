//! Sync module - reconcile the local meeting folders with the Granola API.
//!
//! This module contains:
//! - Change detection (`updated_at`, with a content fingerprint fallback)
//! - The sync engine: classify, fetch, write, report

pub mod engine;
pub mod signal;

pub use engine::{MeetingOutcome, SyncEngine, SyncEvent, SyncFailure, SyncOptions, SyncReport};
pub use signal::{classify, ChangeSignal, Classification};
