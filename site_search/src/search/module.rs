use std::sync::Arc;
use tracing::info;

use crate::config::SearchConfig;
use crate::sanitize::{Sanitizer, StandardSanitizer};
use crate::search::criteria::{Criteria, CriteriaBuilder, CriteriaHook};
use crate::search::filters::{FilterHook, FilterRegistry, SearchFilter};
use crate::search::loader::SearchLoader;
use crate::search::pager::Pager;
use crate::search::query::SearchRequest;
use crate::search::resolver::{ResultResolver, SearchResultHandler};
use crate::search::unsearchable::{UnsearchableHook, UnsearchableTypes};
use crate::store::ContentStore;

/// Collects extension hooks until every module has registered.
///
/// [`bridge`](Self::bridge) freezes the registrations: the unsearchable list is
/// computed exactly once and the resulting loader and resolver never change.
pub struct SearchModuleBuilder {
    config: SearchConfig,
    sanitizer: Arc<dyn Sanitizer>,
    unsearchable_hooks: Vec<UnsearchableHook>,
    filter_hooks: Vec<FilterHook>,
    criteria_hooks: Vec<CriteriaHook>,
    result_handlers: Vec<Arc<dyn SearchResultHandler>>,
}

impl SearchModuleBuilder {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            sanitizer: Arc::new(StandardSanitizer),
            unsearchable_hooks: Vec::new(),
            filter_hooks: Vec::new(),
            criteria_hooks: Vec::new(),
            result_handlers: Vec::new(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn on_unsearchable<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Vec<String>) + Send + Sync + 'static,
    {
        self.unsearchable_hooks.push(Arc::new(hook));
        self
    }

    pub fn on_add_search_filters<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Vec<SearchFilter>) + Send + Sync + 'static,
    {
        self.filter_hooks.push(Arc::new(hook));
        self
    }

    pub fn on_add_search_criteria<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SearchRequest, &mut Criteria) + Send + Sync + 'static,
    {
        self.criteria_hooks.push(Arc::new(hook));
        self
    }

    pub fn on_search_result<H>(mut self, handler: H) -> Self
    where
        H: SearchResultHandler + 'static,
    {
        self.result_handlers.push(Arc::new(handler));
        self
    }

    pub fn bridge(self, store: Arc<dyn ContentStore>) -> SearchModule {
        let unsearchable = UnsearchableTypes::collect(&self.unsearchable_hooks);
        let excluded: Vec<&str> = unsearchable.iter().collect();
        info!(
            unsearchable = ?excluded,
            filter_hooks = self.filter_hooks.len(),
            criteria_hooks = self.criteria_hooks.len(),
            result_handlers = self.result_handlers.len(),
            "Search module bridged"
        );

        let registry = self
            .filter_hooks
            .into_iter()
            .fold(FilterRegistry::new(self.config.filters.clone()), FilterRegistry::with_hook);

        let criteria = self
            .criteria_hooks
            .into_iter()
            .fold(CriteriaBuilder::new(unsearchable), CriteriaBuilder::with_hook);

        let resolver = self
            .result_handlers
            .into_iter()
            .fold(ResultResolver::new(store.clone()), ResultResolver::with_handler);

        let loader = SearchLoader::new(
            registry,
            criteria,
            Pager::new(self.config.per_page),
            store,
            self.sanitizer,
            self.config.page_type.clone(),
        );

        SearchModule {
            loader: Arc::new(loader),
            resolver: Arc::new(resolver),
            action_prefix: self.config.action_prefix,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchModule {
    pub loader: Arc<SearchLoader>,
    pub resolver: Arc<ResultResolver>,
    action_prefix: String,
}

impl SearchModule {
    pub fn builder(config: SearchConfig) -> SearchModuleBuilder {
        SearchModuleBuilder::new(config)
    }

    pub fn action_prefix(&self) -> &str {
        &self.action_prefix
    }

    /// Route of the click-time resolver, e.g. `/apos-search/search-result`.
    pub fn result_route(&self) -> String {
        format!("{}/search-result", self.action_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FiltersSetting;
    use crate::search::loader::LoaderOutcome;
    use crate::search::query::RequestQuery;
    use crate::store::{MemoryStore, Page};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert(Page::new("/search", "Search", "search"));
        store.insert(Page::new("/news/cats", "Cats in the news", "news"));
        store.insert(Page::new("/cats", "Cats", "default"));
        store.insert(Page::new("/trash/cats", "Deleted cats", "trash"));
        Arc::new(store)
    }

    async fn render(module: &SearchModule, query: RequestQuery) -> Vec<String> {
        let request = SearchRequest::new("/search", Some(Page::new("/search", "Search", "search")), query);
        match module.loader.load(&request).await {
            LoaderOutcome::Rendered(view) => view.search.into_iter().map(|p| p.slug).collect(),
            other => panic!("expected rendered view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsearchable_hooks_run_once_at_bridge() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let module = SearchModule::builder(SearchConfig::default())
            .on_unsearchable(move |types: &mut Vec<String>| {
                counter.fetch_add(1, Ordering::SeqCst);
                types.push("trash".to_string());
            })
            .bridge(store());

        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut slugs = render(&module, RequestQuery::new().with("q", "cats")).await;
        slugs.sort();
        assert_eq!(slugs, vec!["/cats", "/news/cats"]);
        render(&module, RequestQuery::new()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_filter_and_criteria_hooks_shape_results() {
        let module = SearchModule::builder(SearchConfig::default())
            .on_add_search_filters(|filters: &mut Vec<SearchFilter>| {
                filters.push(SearchFilter::new("news", "News"));
            })
            .on_add_search_criteria(|_request: &SearchRequest, criteria: &mut Criteria| {
                criteria.exclude_types(["trash"]);
            })
            .bridge(store());

        let slugs = render(&module, RequestQuery::new().with("other", "0")).await;
        assert_eq!(slugs, vec!["/news/cats"]);
    }

    #[tokio::test]
    async fn test_disabled_filters_ignore_flags() {
        let config = SearchConfig {
            filters: FiltersSetting::Enabled(false),
            ..SearchConfig::default()
        };
        let module = SearchModule::builder(config).bridge(store());

        let slugs = render(&module, RequestQuery::new().with("other", "0").with("q", "cats")).await;
        assert_eq!(slugs.len(), 3);
    }

    /// Only the literal `yes` turns a flag on, and every page request lands on page 2.
    struct StrictSanitizer;

    impl Sanitizer for StrictSanitizer {
        fn string(&self, value: Option<&str>) -> String {
            StandardSanitizer.string(value)
        }

        fn boolean(&self, value: Option<&str>, default: bool) -> bool {
            match value {
                Some(raw) => raw == "yes",
                None => default,
            }
        }

        fn integer(&self, _value: Option<&str>, _default: i64, _min: i64, _max: Option<i64>) -> i64 {
            2
        }
    }

    #[tokio::test]
    async fn test_injected_sanitizer_drives_flags_and_paging() {
        let module = SearchModule::builder(SearchConfig {
            per_page: 1,
            ..SearchConfig::default()
        })
        .with_sanitizer(Arc::new(StrictSanitizer))
        .on_add_search_filters(|filters: &mut Vec<SearchFilter>| {
            filters.push(SearchFilter::new("news", "News"));
        })
        .bridge(store());

        let query = RequestQuery::new().with("news", "on").with("other", "yes");
        let request = SearchRequest::new("/search", Some(Page::new("/search", "Search", "search")), query);
        let view = match module.loader.load(&request).await {
            LoaderOutcome::Rendered(view) => view,
            other => panic!("expected rendered view, got {:?}", other),
        };

        assert_eq!(view.pager.page, 2);
        assert_eq!(view.filter_status.get("news").map(String::as_str), Some("0"));
        assert_eq!(view.filter_status.get("other").map(String::as_str), Some(""));
        assert!(view.search_filters.iter().any(|f| f.name == "news" && !f.active));
        assert_eq!(view.search.len(), 1);
        assert!(view.search.iter().all(|page| page.page_type != "news"));
    }

    #[test]
    fn test_result_route() {
        let config = SearchConfig {
            action_prefix: "/find".to_string(),
            ..SearchConfig::default()
        };
        let module = SearchModule::builder(config).bridge(Arc::new(MemoryStore::new()));

        assert_eq!(module.action_prefix(), "/find");
        assert_eq!(module.result_route(), "/find/search-result");
    }
}
