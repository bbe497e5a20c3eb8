//! Pagination progress for one committed query.
//!
//! Items are kept in arrival order and only ever appended while the query
//! lives. `total_count` is whatever the service last reported, which is the
//! number of matches for the query and not `items.len()`.
//!
//! The item buffer is shared with the snapshots handed to the view. Taking a
//! snapshot is a reference count bump; appending copies the buffer only while
//! an older snapshot is still alive.

use rpc::search::{Cursor, Page};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PageCursor<R> {
    items: Arc<Vec<R>>,
    total_count: u64,
    cursor: Option<Cursor>,
    exhausted: bool,
}

impl<R> Default for PageCursor<R> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            total_count: 0,
            cursor: None,
            exhausted: false,
        }
    }
}

impl<R> PageCursor<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.items = Arc::new(Vec::new());
        self.total_count = 0;
        self.cursor = None;
        self.exhausted = false;
    }

    /// Whether a fetch may be issued for `query` right now.
    pub fn accepts_fetch(&self, query: &str, in_flight: bool) -> bool {
        !query.is_empty() && !in_flight && !self.exhausted
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Continuation token for the next page, absent before the first page
    /// and after the last one.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<R: Clone> PageCursor<R> {
    /// Merge a freshly received page.
    ///
    /// Records are appended as-is; the service is trusted not to repeat
    /// records within one query.
    pub fn apply_page(&mut self, page: Page<R>) {
        let exhausted = !page.has_more();
        Arc::make_mut(&mut self.items).extend(page.records);
        self.total_count = page.total_count;
        self.cursor = page.next_cursor;
        self.exhausted = exhausted;

        if self.items.len() as u64 > self.total_count {
            warn!(
                items = self.items.len(),
                total_count = self.total_count,
                "service reported fewer matches than it returned"
            );
        }
    }

    /// The accumulated items as the buffer snapshots share.
    pub fn shared_items(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.items)
    }
}
