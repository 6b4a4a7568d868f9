use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::FiltersSetting;

/// Filter name meaning "every type not covered by another filter".
pub const OTHER_FILTER: &str = "other";

/// Callback that may append filters before the list is finalized.
pub type FilterHook = Arc<dyn Fn(&mut Vec<SearchFilter>) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub name: String,
    pub label: String,
    /// Recomputed for every request, never persisted.
    #[serde(default)]
    pub active: bool,
}

impl SearchFilter {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            active: false,
        }
    }

    pub fn is_other(&self) -> bool {
        self.name == OTHER_FILTER
    }
}

/// Produces the ordered filter list for each request.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    hooks: Vec<FilterHook>,
    setting: FiltersSetting,
}

impl FilterRegistry {
    pub fn new(setting: FiltersSetting) -> Self {
        Self {
            hooks: Vec::new(),
            setting,
        }
    }

    pub fn with_hook(mut self, hook: FilterHook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Default list plus hook additions, unless configuration replaces or disables it.
    ///
    /// Hooks always run, in registration order, even when configuration discards
    /// their additions. A configured list is cloned so request-level mutation of
    /// `active` never leaks back into it.
    pub fn build_filters(&self) -> Vec<SearchFilter> {
        let mut filters = vec![SearchFilter::new(OTHER_FILTER, "Pages")];

        for hook in &self.hooks {
            hook(&mut filters);
        }

        match &self.setting {
            FiltersSetting::Enabled(true) => filters,
            FiltersSetting::Enabled(false) => Vec::new(),
            FiltersSetting::Custom(configured) => configured.clone(),
        }
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("hooks", &self.hooks.len())
            .field("setting", &self.setting)
            .finish()
    }
}
