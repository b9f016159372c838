//! granola-sync - Local mirror of Granola meeting notes and transcripts
//!
//! The library behind the `granola` binary:
//! - `auth`: the desktop app's access token
//! - `api`: the Granola HTTP API and the `MeetingSource` seam
//! - `storage`: the on-disk meeting folder tree
//! - `sync`: incremental download of new and changed meetings
//! - `query`: list, show and search over the folder tree

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod formatters;
pub mod query;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use error::{GranolaError, Result};
