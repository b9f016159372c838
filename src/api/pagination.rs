//! Lazy pagination over the document list.

use super::models::MeetingSummary;
use crate::error::Result;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};

/// Documents requested per page
pub const PAGE_SIZE: usize = 100;

/// Anything that can return one page of raw documents.
pub trait PageFetcher {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Value>>;
}

/// Iterator over every document, fetching pages on demand.
///
/// Ends after a short page, an empty page, or a page with no unseen ids. A
/// page error is yielded once and ends the iteration.
pub struct Paginator<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    page_size: usize,
    offset: usize,
    buffer: VecDeque<Value>,
    seen: HashSet<String>,
    exhausted: bool,
}

impl<'a, F: PageFetcher + ?Sized> Paginator<'a, F> {
    pub fn new(fetcher: &'a F, page_size: usize) -> Self {
        Self {
            fetcher,
            page_size: page_size.max(1),
            offset: 0,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            exhausted: false,
        }
    }

    fn next_page(&mut self) -> Result<()> {
        let page = self.fetcher.fetch_page(self.offset, self.page_size)?;
        tracing::debug!(offset = self.offset, len = page.len(), "fetched document page");

        if page.len() < self.page_size {
            self.exhausted = true;
        }
        self.offset += page.len();

        let before = self.buffer.len();
        for doc in page {
            if let Some(id) = doc.get("id").and_then(Value::as_str) {
                if !self.seen.insert(id.to_string()) {
                    continue;
                }
            }
            self.buffer.push_back(doc);
        }
        if self.buffer.len() == before {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl<F: PageFetcher + ?Sized> Iterator for Paginator<'_, F> {
    type Item = Result<MeetingSummary>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.buffer.pop_front() {
                match MeetingSummary::from_value(raw) {
                    Ok(summary) => return Some(Ok(summary)),
                    Err(e) => {
                        tracing::warn!("Skipping malformed document: {}", e);
                        continue;
                    }
                }
            }

            if self.exhausted {
                return None;
            }

            if let Err(e) = self.next_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(e));
            }
        }
    }
}
