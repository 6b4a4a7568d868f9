use std::sync::Arc;

/// Callback through which a module declares page types that must never show up in results.
pub type UnsearchableHook = Arc<dyn Fn(&mut Vec<String>) + Send + Sync>;

/// Page types excluded from every search, collected once after all modules register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsearchableTypes(Arc<[String]>);

impl Default for UnsearchableTypes {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl UnsearchableTypes {
    /// Runs each hook once, in order, over a shared list.
    pub fn collect(hooks: &[UnsearchableHook]) -> Self {
        let mut types = Vec::new();
        for hook in hooks {
            hook(&mut types);
        }
        Self(types.into())
    }

    pub fn from_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, page_type: &str) -> bool {
        self.0.iter().any(|t| t == page_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
