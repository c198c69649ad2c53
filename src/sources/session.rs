//! Scoped live-fetch session.
//!
//! A [`FetchSession`] borrows the resolver's [`LiveProfileFetcher`] for the
//! length of one resolution run. It opens the fetcher on creation, pauses a
//! fixed delay after every fetch, turns fetch failures into empty results,
//! and closes the fetcher when dropped.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::normalize::{AuthorListingRecord, ProfilePageRecord};
use crate::sources::traits::LiveProfileFetcher;

/// Fixed post-fetch pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    /// Creates a throttle pausing `delay` after each fetch.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Blocks for the configured delay.
    pub fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

/// Live-fetch session scoped to one resolution run.
pub struct FetchSession<'a> {
    fetcher: &'a mut dyn LiveProfileFetcher,
    throttle: Throttle,
}

impl<'a> FetchSession<'a> {
    /// Opens the fetcher. Returns `None` (and logs) if it cannot be opened.
    pub fn open(fetcher: &'a mut dyn LiveProfileFetcher, delay: Duration) -> Option<Self> {
        if let Err(e) = fetcher.open() {
            warn!(source = fetcher.name(), error = %e, "live fetcher unavailable");
            return None;
        }
        debug!(source = fetcher.name(), "live fetch session opened");
        Some(Self {
            fetcher,
            throttle: Throttle::new(delay),
        })
    }

    /// Fetches a profile page; failures and missing structure yield `None`.
    pub fn profile_page(&mut self, url: &str, simple: bool) -> Option<ProfilePageRecord> {
        let result = self.fetcher.fetch_profile_page(url, simple);
        self.throttle.pause();
        match result {
            Ok(page) => {
                if page.is_none() {
                    debug!(url, "profile page had no usable structure");
                }
                page
            }
            Err(e) => {
                warn!(source = self.fetcher.name(), url, error = %e, "profile page fetch failed");
                None
            }
        }
    }

    /// Runs an author search; failures yield an empty list.
    pub fn search(&mut self, query_fragment: &str) -> Vec<AuthorListingRecord> {
        let result = self.fetcher.fetch_search_results(query_fragment);
        self.throttle.pause();
        match result {
            Ok(listings) => {
                debug!(query_fragment, count = listings.len(), "author search");
                listings
            }
            Err(e) => {
                warn!(source = self.fetcher.name(), query_fragment, error = %e, "author search failed");
                Vec::new()
            }
        }
    }
}

impl Drop for FetchSession<'_> {
    fn drop(&mut self) {
        self.fetcher.close();
        debug!(source = self.fetcher.name(), "live fetch session closed");
    }
}

impl std::fmt::Debug for FetchSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSession")
            .field("fetcher", &self.fetcher.name())
            .field("throttle", &self.throttle)
            .finish()
    }
}
