use serde::{Deserialize, Serialize};

use crate::sanitize::Sanitizer;
use crate::search::query::{RequestQuery, SearchOptions};

/// Highest page number that is ever queried or reported.
///
/// Deep skips are expensive for the store and nobody reads page 500 of a site search.
pub const MAX_PAGES: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerState {
    pub page: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    per_page: u64,
}

impl Default for Pager {
    fn default() -> Self {
        Self { per_page: 10 }
    }
}

impl Pager {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Sets `skip`/`limit` on `options` and returns the requested page number.
    pub fn apply(&self, query: &RequestQuery, sanitizer: &dyn Sanitizer, options: &mut SearchOptions) -> u64 {
        let page = sanitizer.integer(query.get("page"), 1, 1, None).max(1) as u64;

        options.skip = self.per_page.saturating_mul(page - 1);
        options.limit = self.per_page;

        page
    }

    pub fn exceeds_limit(page: u64) -> bool {
        page > MAX_PAGES
    }

    /// Page count for `total_count` results, clamped to `1..=MAX_PAGES`.
    pub fn finalize(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.per_page).clamp(1, MAX_PAGES)
    }
}
