pub mod criteria;
pub mod filters;
pub mod loader;
pub mod module;
pub mod pager;
pub mod query;
pub mod resolver;
pub mod unsearchable;

pub use criteria::{Criteria, CriteriaBuilder, CriteriaHook, FilterReconciliation, FilterStatus, TypeCriteria};
pub use filters::{FilterHook, FilterRegistry, SearchFilter, OTHER_FILTER};
pub use loader::{LoaderOutcome, SearchLoader, SearchView, INDEX_TEMPLATE};
pub use module::{SearchModule, SearchModuleBuilder};
pub use pager::{Pager, PagerState, MAX_PAGES};
pub use query::{RequestQuery, SearchOptions, SearchRequest, Sort, SortField, CHRONOLOGICAL_FIELDS, QUALITY_SORT};
pub use resolver::{HandlerOutcome, Resolution, ResultRequest, ResultResolver, SearchResultHandler};
pub use unsearchable::{UnsearchableHook, UnsearchableTypes};
