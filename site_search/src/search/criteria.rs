use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::sanitize::Sanitizer;
use crate::search::filters::{SearchFilter, OTHER_FILTER};
use crate::search::query::SearchRequest;
use crate::search::unsearchable::UnsearchableTypes;

/// Marker recorded in [`FilterStatus`] for a filter that is switched on.
pub const ACTIVE_MARKER: &str = "";
/// Marker recorded in [`FilterStatus`] for a filter that is switched off.
pub const INACTIVE_MARKER: &str = "0";

/// Filter name to query-string marker, used only to rebuild toggle links.
pub type FilterStatus = BTreeMap<String, String>;

/// Callback that may add constraints to the criteria before the store sees them.
pub type CriteriaHook = Arc<dyn Fn(&SearchRequest, &mut Criteria) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl TypeCriteria {
    pub fn is_empty(&self) -> bool {
        self.include.as_ref().map_or(true, Vec::is_empty)
            && self.exclude.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Filter expression handed to the content store.
///
/// `type_criteria` is only present when it actually restricts something;
/// `fields` holds exact-match constraints added by extensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_criteria: Option<TypeCriteria>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Adds types to the exclusion list, creating the type restriction if needed.
    pub fn exclude_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = types.into_iter().map(Into::into).peekable();
        if added.peek().is_none() {
            return;
        }
        self.type_criteria
            .get_or_insert_with(TypeCriteria::default)
            .exclude
            .get_or_insert_with(Vec::new)
            .extend(added);
    }

    pub fn included_types(&self) -> Option<&[String]> {
        self.type_criteria.as_ref()?.include.as_deref()
    }

    pub fn excluded_types(&self) -> Option<&[String]> {
        self.type_criteria.as_ref()?.exclude.as_deref()
    }
}

/// Result of reconciling one request's filter flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterReconciliation {
    pub criteria: Criteria,
    pub filter_status: FilterStatus,
    /// Filters in their original order with `active` set for this request.
    pub filters: Vec<SearchFilter>,
    pub active: Vec<String>,
    pub inactive: Vec<String>,
}

/// Turns filter flags and the unsearchable list into store criteria.
#[derive(Clone, Default)]
pub struct CriteriaBuilder {
    unsearchable: UnsearchableTypes,
    hooks: Vec<CriteriaHook>,
}

impl CriteriaBuilder {
    pub fn new(unsearchable: UnsearchableTypes) -> Self {
        Self {
            unsearchable,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: CriteriaHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn build(
        &self,
        mut filters: Vec<SearchFilter>,
        request: &SearchRequest,
        sanitizer: &dyn Sanitizer,
    ) -> FilterReconciliation {
        let mut active = Vec::new();
        let mut inactive = Vec::new();
        let mut filter_status = FilterStatus::new();

        for filter in filters.iter_mut() {
            filter.active = sanitizer.boolean(request.query.get(&filter.name), true);
            if filter.active {
                active.push(filter.name.clone());
                filter_status.insert(filter.name.clone(), ACTIVE_MARKER.to_string());
            } else {
                inactive.push(filter.name.clone());
                filter_status.insert(filter.name.clone(), INACTIVE_MARKER.to_string());
            }
        }

        let mut type_criteria = TypeCriteria::default();

        if !inactive.is_empty() {
            if active.iter().any(|name| name == OTHER_FILTER) {
                type_criteria.exclude = Some(
                    inactive
                        .iter()
                        .filter(|name| name.as_str() != OTHER_FILTER)
                        .cloned()
                        .collect(),
                );
            } else {
                type_criteria.include = Some(active.clone());
            }
        }

        // Unsearchable types always land in the exclusion list, even when the
        // filters produced an inclusion list that names one of them.
        if !self.unsearchable.is_empty() {
            type_criteria
                .exclude
                .get_or_insert_with(Vec::new)
                .extend(self.unsearchable.iter().map(str::to_string));
        }

        type_criteria.include = type_criteria.include.filter(|types| !types.is_empty());
        type_criteria.exclude = type_criteria.exclude.filter(|types| !types.is_empty());

        let mut criteria = Criteria::new();
        if !type_criteria.is_empty() {
            criteria.type_criteria = Some(type_criteria);
        }

        for hook in &self.hooks {
            hook(request, &mut criteria);
        }

        debug!(
            active = ?active,
            inactive = ?inactive,
            criteria = ?criteria,
            "Reconciled search filters"
        );

        FilterReconciliation {
            criteria,
            filter_status,
            filters,
            active,
            inactive,
        }
    }
}

impl std::fmt::Debug for CriteriaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriteriaBuilder")
            .field("unsearchable", &self.unsearchable)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
