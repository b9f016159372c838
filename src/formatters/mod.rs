//! Formatters module - render meetings into human-readable documents.

pub mod markdown;

pub use markdown::MarkdownFormatter;

use crate::api::MeetingDetail;

/// Trait for all transcript formatters
pub trait Formatter {
    /// Render a meeting into a document
    fn format(&self, meeting: &MeetingDetail) -> String;

    /// File name of the rendered document inside a meeting folder
    fn file_name(&self) -> &'static str;
}
