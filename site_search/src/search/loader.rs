use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::sanitize::Sanitizer;
use crate::search::criteria::{CriteriaBuilder, FilterStatus};
use crate::search::filters::{FilterRegistry, SearchFilter};
use crate::search::pager::{Pager, PagerState};
use crate::search::query::{SearchOptions, SearchRequest, Sort};
use crate::store::{ContentStore, Page};

/// Template the view layer renders for a search page.
pub const INDEX_TEMPLATE: &str = "index";

/// Data handed to the view layer for a rendered search page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub template: &'static str,
    pub q: String,
    pub filter_status: FilterStatus,
    pub search_filters: Vec<SearchFilter>,
    pub pager: PagerState,
    pub search: Vec<Page>,
}

/// Terminal state of one loader invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderOutcome {
    /// Not a search page; the request continues through normal page handling.
    NotApplicable,
    /// Requested page is past the pager ceiling. The store was not queried.
    NotFound,
    /// The store failed. Details were logged; the requester gets a generic server error.
    Failed,
    Rendered(SearchView),
}

pub struct SearchLoader {
    registry: FilterRegistry,
    criteria: CriteriaBuilder,
    pager: Pager,
    store: Arc<dyn ContentStore>,
    sanitizer: Arc<dyn Sanitizer>,
    page_type: String,
}

impl SearchLoader {
    pub fn new(
        registry: FilterRegistry,
        criteria: CriteriaBuilder,
        pager: Pager,
        store: Arc<dyn ContentStore>,
        sanitizer: Arc<dyn Sanitizer>,
        page_type: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            criteria,
            pager,
            store,
            sanitizer,
            page_type: page_type.into(),
        }
    }

    pub fn page_type(&self) -> &str {
        &self.page_type
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub async fn load(&self, request: &SearchRequest) -> LoaderOutcome {
        // Only exact matches are ours; a request below the search page is not.
        let Some(page) = &request.page else {
            return LoaderOutcome::NotApplicable;
        };
        if page.page_type != self.page_type {
            return LoaderOutcome::NotApplicable;
        }

        let filters = self.registry.build_filters();
        let reconciliation = self.criteria.build(filters, request, self.sanitizer.as_ref());

        let q = self.sanitizer.string(request.query.get("q"));
        let mut options = SearchOptions::new()
            .with_sort(Sort::from_param(request.query.get("sort")))
            .with_search(q.clone());

        let page_number = self.pager.apply(&request.query, self.sanitizer.as_ref(), &mut options);
        if Pager::exceeds_limit(page_number) {
            warn!(
                path = %request.path,
                page = page_number,
                "Search page number past the pager limit"
            );
            return LoaderOutcome::NotFound;
        }

        debug!(
            path = %request.path,
            q = %q,
            sort = ?options.sort,
            skip = options.skip,
            limit = options.limit,
            "Querying content store"
        );

        let results = match self.store.search(&reconciliation.criteria, &options).await {
            Ok(results) => results,
            Err(err) => {
                error!(path = %request.path, error = %err, "Search query failed");
                return LoaderOutcome::Failed;
            }
        };

        LoaderOutcome::Rendered(SearchView {
            template: INDEX_TEMPLATE,
            q,
            filter_status: reconciliation.filter_status,
            search_filters: reconciliation.filters,
            pager: PagerState {
                page: page_number,
                total: self.pager.finalize(results.total),
            },
            search: results.pages,
        })
    }
}

impl std::fmt::Debug for SearchLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchLoader")
            .field("registry", &self.registry)
            .field("criteria", &self.criteria)
            .field("pager", &self.pager)
            .field("page_type", &self.page_type)
            .finish()
    }
}
