//! Click-time resolution of search results to their live location.
//!
//! Working out the canonical URL of every listed result would cost one lookup
//! per result per page view. Results instead link to the resolver endpoint,
//! which only does the work for the result that was actually clicked.

use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::search::query::RequestQuery;
use crate::store::{ContentStore, Page};

/// The request that hit the resolver endpoint.
#[derive(Debug, Clone, Default)]
pub struct ResultRequest {
    pub slug: String,
    pub query: RequestQuery,
    pub headers: HeaderMap,
}

impl ResultRequest {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Self::default()
        }
    }
}

pub enum HandlerOutcome {
    /// The handler owns the response from here on.
    Accepted(Response),
    Declined,
}

/// Knows where some kind of non-page result lives.
///
/// Handlers are asked in registration order; the first to accept wins and the
/// rest are never consulted.
#[async_trait]
pub trait SearchResultHandler: Send + Sync {
    async fn handle(&self, request: &ResultRequest, page: &Page) -> HandlerOutcome;
}

pub enum Resolution {
    Redirect(String),
    Handled(Response),
    NotFound,
    Failed,
}

impl Resolution {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Resolution::Redirect(target) => Some(target.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Redirect(target) => f.debug_tuple("Redirect").field(target).finish(),
            Resolution::Handled(response) => f.debug_tuple("Handled").field(&response.status()).finish(),
            Resolution::NotFound => f.write_str("NotFound"),
            Resolution::Failed => f.write_str("Failed"),
        }
    }
}

impl IntoResponse for Resolution {
    fn into_response(self) -> Response {
        match self {
            Resolution::Redirect(target) => (StatusCode::FOUND, [(header::LOCATION, target)]).into_response(),
            Resolution::Handled(response) => response,
            Resolution::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            Resolution::Failed => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        }
    }
}

#[derive(Clone)]
pub struct ResultResolver {
    store: Arc<dyn ContentStore>,
    handlers: Vec<Arc<dyn SearchResultHandler>>,
}

impl ResultResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            handlers: Vec::new(),
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn SearchResultHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub async fn resolve(&self, request: &ResultRequest) -> Resolution {
        let page = match self.store.get_page(&request.slug).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                warn!(slug = %request.slug, "Search result not found");
                return Resolution::NotFound;
            }
            Err(err) => {
                error!(slug = %request.slug, error = %err, "Search result lookup failed");
                return Resolution::Failed;
            }
        };

        if page.has_path_slug() {
            debug!(slug = %page.slug, "Redirecting to search result");
            return Resolution::Redirect(page.slug);
        }

        for handler in &self.handlers {
            if let HandlerOutcome::Accepted(response) = handler.handle(request, &page).await {
                debug!(slug = %page.slug, page_type = %page.page_type, "Search result claimed by handler");
                return Resolution::Handled(response);
            }
        }

        warn!(
            slug = %page.slug,
            page_type = %page.page_type,
            "No handler accepted search result"
        );
        Resolution::NotFound
    }
}

impl std::fmt::Debug for ResultResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultResolver")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::search::criteria::Criteria;
    use crate::search::query::SearchOptions;
    use crate::store::{MemoryStore, SearchResults};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct UnreachableStore;

    #[async_trait]
    impl ContentStore for UnreachableStore {
        async fn search(&self, _criteria: &Criteria, _options: &SearchOptions) -> Result<SearchResults, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        async fn get_page(&self, _slug: &str) -> Result<Option<Page>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
    }

    /// Accepts pages of one type and counts every invocation.
    struct TypeHandler {
        page_type: &'static str,
        prefix: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchResultHandler for TypeHandler {
        async fn handle(&self, _request: &ResultRequest, page: &Page) -> HandlerOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if page.page_type != self.page_type {
                return HandlerOutcome::Declined;
            }
            let location = format!("{}/{}", self.prefix, page.slug);
            HandlerOutcome::Accepted((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
    }

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert(Page::new("/news/cat-show", "Cat show", "news"));
        store.insert(Page::new("jane-doe", "Jane Doe", "person"));
        store.insert(Page::new("spring-fair", "Spring fair", "event"));
        Arc::new(store)
    }

    fn handler(page_type: &'static str, prefix: &'static str, calls: &Arc<AtomicUsize>) -> Arc<dyn SearchResultHandler> {
        Arc::new(TypeHandler {
            page_type,
            prefix,
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn test_path_slug_redirects_without_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ResultResolver::new(store()).with_handler(handler("news", "/elsewhere", &calls));

        let resolution = resolver.resolve(&ResultRequest::new("/news/cat-show")).await;
        assert_eq!(resolution.redirect_target(), Some("/news/cat-show"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = resolution.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/news/cat-show");
    }

    #[tokio::test]
    async fn test_missing_result_is_not_found_without_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ResultResolver::new(store()).with_handler(handler("person", "/people", &calls));

        let resolution = resolver.resolve(&ResultRequest::new("nobody")).await;
        assert!(resolution.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolution.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_first_accepting_handler_wins() {
        let person_calls = Arc::new(AtomicUsize::new(0));
        let event_calls = Arc::new(AtomicUsize::new(0));
        let late_calls = Arc::new(AtomicUsize::new(0));
        let resolver = ResultResolver::new(store())
            .with_handler(handler("event", "/events", &event_calls))
            .with_handler(handler("person", "/people", &person_calls))
            .with_handler(handler("person", "/staff", &late_calls));

        let response = resolver.resolve(&ResultRequest::new("jane-doe")).await.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/people/jane-doe");
        assert_eq!(event_calls.load(Ordering::SeqCst), 1);
        assert_eq!(person_calls.load(Ordering::SeqCst), 1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unclaimed_result_is_not_found() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ResultResolver::new(store()).with_handler(handler("person", "/people", &calls));

        let resolution = resolver.resolve(&ResultRequest::new("spring-fair")).await;
        assert!(resolution.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let resolver = ResultResolver::new(store());
        assert!(resolver.resolve(&ResultRequest::new("spring-fair")).await.is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_server_error_without_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ResultResolver::new(Arc::new(UnreachableStore))
            .with_handler(handler("person", "/people", &calls));

        let resolution = resolver.resolve(&ResultRequest::new("jane-doe")).await;
        assert!(matches!(resolution, Resolution::Failed));
        assert!(!resolution.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = resolution.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Internal Server Error");
    }
}
