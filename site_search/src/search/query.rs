use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::store::Page;

/// Sort token that selects relevance ordering.
pub const QUALITY_SORT: &str = "quality";

/// Raw query-string parameters of an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestQuery(HashMap<String, String>);

impl RequestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl From<HashMap<String, String>> for RequestQuery {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What the loader knows about the request it is asked to handle.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub path: String,
    /// Page whose slug matched the request path exactly, if any.
    pub page: Option<Page>,
    pub query: RequestQuery,
}

impl SearchRequest {
    pub fn new(path: impl Into<String>, page: Option<Page>, query: RequestQuery) -> Self {
        Self {
            path: path.into(),
            page,
            query,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Start,
    PublishedAt,
    CreatedAt,
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortField::Start => write!(f, "start"),
            SortField::PublishedAt => write!(f, "publishedAt"),
            SortField::CreatedAt => write!(f, "createdAt"),
        }
    }
}

/// Priority order for chronological sorting; the first field with a value wins.
pub const CHRONOLOGICAL_FIELDS: [SortField; 3] =
    [SortField::Start, SortField::PublishedAt, SortField::CreatedAt];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sort {
    /// Store-assigned relevance score, best first.
    Quality,
    /// Newest first by [`CHRONOLOGICAL_FIELDS`].
    Chronological,
}

impl Sort {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some(QUALITY_SORT) => Sort::Quality,
            Some(_) => Sort::Chronological,
        }
    }
}

/// Everything besides the criteria that the store needs to run a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub sort: Sort,
    pub search: String,
    pub skip: u64,
    pub limit: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort: Sort::Quality,
            search: String::new(),
            skip: 0,
            limit: 0,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_pagination(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_from_param() {
        assert_eq!(Sort::from_param(None), Sort::Quality);
        assert_eq!(Sort::from_param(Some("")), Sort::Quality);
        assert_eq!(Sort::from_param(Some("quality")), Sort::Quality);
        assert_eq!(Sort::from_param(Some("date")), Sort::Chronological);
        assert_eq!(Sort::from_param(Some("Quality")), Sort::Chronological);
    }

    #[test]
    fn test_sort_field_display() {
        let names: Vec<String> = CHRONOLOGICAL_FIELDS.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["start", "publishedAt", "createdAt"]);
    }

    #[test]
    fn test_request_query_lookup() {
        let query = RequestQuery::new().with("q", "cats").with("page", "2");
        assert_eq!(query.get("q"), Some("cats"));
        assert_eq!(query.get("page"), Some("2"));
        assert_eq!(query.get("sort"), None);
    }

    #[test]
    fn test_search_options_builder() {
        let options = SearchOptions::new()
            .with_sort(Sort::Chronological)
            .with_search("cats")
            .with_pagination(10, 10);

        assert_eq!(options.sort, Sort::Chronological);
        assert_eq!(options.search, "cats");
        assert_eq!(options.skip, 10);
        assert_eq!(options.limit, 10);
    }
}
