//! Query module - read-only views over the storage tree.
//!
//! Nothing here talks to the network:
//! - `dates`: `today` / `last week` / `YYYY-MM-DD` expressions
//! - `filter`: `list` predicates and the compact projection
//! - `search`: regex search over transcripts
//! - `show`: a single meeting

pub mod dates;
pub mod filter;
pub mod search;
pub mod show;

pub use dates::{parse_date, parse_date_local};
pub use filter::{compile_pattern, CompactMeeting, ListFilter};
pub use search::{search, SearchMatch, SearchResult};
pub use show::{show, ShowResult};
