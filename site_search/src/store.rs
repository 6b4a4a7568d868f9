//! Content store seam and the in-memory implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::search::{Criteria, SearchOptions, Sort, SortField, CHRONOLOGICAL_FIELDS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Page {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, page_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: slug.into(),
            title: title.into(),
            page_type: page_type.into(),
            body: None,
            tags: Vec::new(),
            start: None,
            published_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn timestamp(&self, field: SortField) -> Option<DateTime<Utc>> {
        match field {
            SortField::Start => self.start,
            SortField::PublishedAt => self.published_at,
            SortField::CreatedAt => Some(self.created_at),
        }
    }

    /// First timestamp present in [`CHRONOLOGICAL_FIELDS`] order.
    pub fn chronological_key(&self) -> Option<DateTime<Utc>> {
        CHRONOLOGICAL_FIELDS.iter().find_map(|field| self.timestamp(*field))
    }

    /// Slugs of ordinary pages are nested paths such as `/about/team`.
    pub fn has_path_slug(&self) -> bool {
        self.slug.contains('/')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub pages: Vec<Page>,
    /// Matches before `skip`/`limit` were applied.
    pub total: u64,
}

/// Where pages live and how they are queried.
///
/// Projects swap the query implementation by providing their own store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn search(&self, criteria: &Criteria, options: &SearchOptions) -> Result<SearchResults, StoreError>;

    async fn get_page(&self, slug: &str) -> Result<Option<Page>, StoreError>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    pages: Arc<RwLock<HashMap<String, Page>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_content() -> Self {
        let store = Self::new();
        let now = Utc::now();

        store.insert(Page::new("/", "Home", "home").with_body("Welcome to the site"));
        store.insert(Page::new("/search", "Search", "search"));
        store.insert(
            Page::new("/about", "About Us", "default")
                .with_body("We are a small team that loves cats and open source"),
        );
        store.insert(
            Page::new("/news/cat-show", "Cat show announced", "news")
                .with_body("The annual cat show returns this spring")
                .with_tags(vec!["cats".to_string(), "events".to_string()])
                .with_published_at(now - chrono::Duration::days(2)),
        );
        store.insert(
            Page::new("/events/adoption-day", "Adoption day", "event")
                .with_body("Meet cats and dogs looking for a home")
                .with_start(now + chrono::Duration::days(14)),
        );
        store.insert(
            Page::new("jane-doe", "Jane Doe", "person")
                .with_body("Jane looks after the cats at the shelter"),
        );
        store.insert(Page::new("/trash/old-draft", "Old cat draft", "trash"));

        store
    }

    pub fn insert(&self, page: Page) -> Option<Page> {
        self.pages.write().insert(page.slug.clone(), page)
    }

    fn matches_criteria(page: &Page, criteria: &Criteria) -> bool {
        if let Some(types) = criteria.included_types() {
            if !types.is_empty() && !types.iter().any(|t| *t == page.page_type) {
                return false;
            }
        }

        if let Some(types) = criteria.excluded_types() {
            if types.iter().any(|t| *t == page.page_type) {
                return false;
            }
        }

        if criteria.fields.is_empty() {
            return true;
        }

        let document = match serde_json::to_value(page) {
            Ok(value) => value,
            Err(_) => return false,
        };

        criteria
            .fields
            .iter()
            .all(|(key, expected)| document.get(key) == Some(expected))
    }

    /// Relevance of `page` for the whitespace-separated `terms`, `None` when a term is missing.
    fn score(page: &Page, terms: &[String]) -> Option<u64> {
        if terms.is_empty() {
            return Some(0);
        }

        let title = page.title.to_lowercase();
        let body = page.body.as_deref().unwrap_or_default().to_lowercase();
        let tags: Vec<String> = page.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut score = 0u64;
        for term in terms {
            let in_title = title.matches(term.as_str()).count() as u64;
            let in_body = body.matches(term.as_str()).count() as u64;
            let in_tags = tags.iter().filter(|t| t.contains(term.as_str())).count() as u64;

            if in_title + in_body + in_tags == 0 {
                return None;
            }
            score += in_title * 3 + in_tags * 2 + in_body;
        }
        Some(score)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn search(&self, criteria: &Criteria, options: &SearchOptions) -> Result<SearchResults, StoreError> {
        let terms: Vec<String> = options
            .search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut hits: Vec<(u64, Page)> = {
            let pages = self.pages.read();
            pages
                .values()
                .filter(|page| Self::matches_criteria(page, criteria))
                .filter_map(|page| Self::score(page, &terms).map(|score| (score, page.clone())))
                .collect()
        };

        match options.sort {
            Sort::Quality => hits.sort_by(|(a_score, a), (b_score, b)| {
                b_score.cmp(a_score).then_with(|| a.title.cmp(&b.title))
            }),
            Sort::Chronological => hits.sort_by(|(_, a), (_, b)| {
                let newest_first = match (a.chronological_key(), b.chronological_key()) {
                    (Some(a_key), Some(b_key)) => b_key.cmp(&a_key),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                newest_first.then_with(|| a.title.cmp(&b.title))
            }),
        }

        let total = hits.len() as u64;
        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(options.limit).unwrap_or(usize::MAX);

        let pages = hits.into_iter().skip(skip).take(limit).map(|(_, page)| page).collect();

        debug!("Memory store search for '{}' matched {} pages", options.search, total);

        Ok(SearchResults { pages, total })
    }

    async fn get_page(&self, slug: &str) -> Result<Option<Page>, StoreError> {
        Ok(self.pages.read().get(slug).cloned())
    }
}
