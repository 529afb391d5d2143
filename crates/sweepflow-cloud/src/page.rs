//! Paged listing
//!
//! Providers implement [`PageSource`], which fetches exactly one page for a
//! given cursor. [`PagedLister`] owns the cursor state machine on top of it so
//! that no cleaner ever handles continuation tokens itself.

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use std::fmt::Debug;

/// One bounded batch of listed items plus the cursor for the next batch
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePage<T, C> {
    pub items: Vec<T>,

    /// `None` when this is the final page
    pub next: Option<C>,
}

impl<T, C> ResourcePage<T, C> {
    /// A page with more pages after it
    pub fn new(items: Vec<T>, next: Option<C>) -> Self {
        Self { items, next }
    }

    /// The final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// A listing API that returns results one page at a time
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Cursor: Clone + Debug + PartialEq + Send + Sync;

    /// Fetch the page starting at `cursor`, or the first page when `cursor` is `None`
    async fn fetch_page(
        &self,
        cursor: Option<&Self::Cursor>,
    ) -> Result<ResourcePage<Self::Item, Self::Cursor>>;
}

#[derive(Debug)]
enum ListState<C> {
    Start,
    Next(C),
    Exhausted,
}

/// Walks every page of a [`PageSource`] exactly once
///
/// A new lister always starts at the first page. After an error the lister is
/// exhausted; listing again means creating a new lister. A source that hands
/// back the cursor it was just called with is treated as a listing error, so
/// a listing always ends.
pub struct PagedLister<'a, S: PageSource> {
    source: &'a S,
    state: ListState<S::Cursor>,
    pages_visited: usize,
}

impl<'a, S: PageSource> PagedLister<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            state: ListState::Start,
            pages_visited: 0,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted
    pub async fn next_page(&mut self) -> Result<Option<ResourcePage<S::Item, S::Cursor>>> {
        let cursor = match &self.state {
            ListState::Exhausted => return Ok(None),
            ListState::Start => None,
            ListState::Next(cursor) => Some(cursor.clone()),
        };

        let page = match self.source.fetch_page(cursor.as_ref()).await {
            Ok(page) => page,
            Err(e) => {
                self.state = ListState::Exhausted;
                return Err(e);
            }
        };

        self.pages_visited += 1;
        if page.next.is_some() && page.next == cursor {
            self.state = ListState::Exhausted;
            return Err(CloudError::ListingFailed(format!(
                "repeated continuation token {:?} after page {}",
                page.next, self.pages_visited
            )));
        }
        self.state = match &page.next {
            Some(next) => ListState::Next(next.clone()),
            None => ListState::Exhausted,
        };

        tracing::debug!(
            page = self.pages_visited,
            items = page.items.len(),
            next = ?page.next,
            "Fetched page"
        );

        Ok(Some(page))
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, ListState::Exhausted)
    }
}
