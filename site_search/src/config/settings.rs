use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::search::SearchFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results shown on each page of the search view.
    pub per_page: u64,
    pub filters: FiltersSetting,
    /// Route prefix for the module's own endpoints, e.g. `/apos-search`.
    pub action_prefix: String,
    /// Page type the loader enhances.
    pub page_type: String,
}

/// How the filter list is produced for each request.
///
/// `true` keeps the default list plus whatever extensions add, `false`
/// turns filtering off, and a list replaces the defaults outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FiltersSetting {
    Enabled(bool),
    Custom(Vec<SearchFilter>),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_page: 10,
            filters: FiltersSetting::default(),
            action_prefix: "/apos-search".to_string(),
            page_type: "search".to_string(),
        }
    }
}

impl Default for FiltersSetting {
    fn default() -> Self {
        FiltersSetting::Enabled(true)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let file = Path::new("config.toml");
        Self::load_from(file.exists().then_some(file))
    }

    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.search.per_page == 0 {
            return Err(ConfigError::Message(
                "Search per_page must be greater than 0".to_string(),
            ));
        }

        if !self.search.action_prefix.starts_with('/') || self.search.action_prefix.len() < 2 {
            return Err(ConfigError::Message(
                "Search action prefix must be a path such as /apos-search".to_string(),
            ));
        }

        if self.search.action_prefix.ends_with('/') {
            return Err(ConfigError::Message(
                "Search action prefix must not end with '/'".to_string(),
            ));
        }

        if self.search.page_type.trim().is_empty() {
            return Err(ConfigError::Message(
                "Search page type cannot be empty".to_string(),
            ));
        }

        if let FiltersSetting::Custom(filters) = &self.search.filters {
            let mut seen = HashSet::new();
            for filter in filters {
                if filter.name.trim().is_empty() {
                    return Err(ConfigError::Message(
                        "Search filter names cannot be empty".to_string(),
                    ));
                }
                if !seen.insert(filter.name.as_str()) {
                    return Err(ConfigError::Message(format!(
                        "Duplicate search filter name: {}",
                        filter.name
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.search.per_page, 10);
        assert_eq!(config.search.action_prefix, "/apos-search");
        assert_eq!(config.search.page_type, "search");
        assert_eq!(config.search.filters, FiltersSetting::Enabled(true));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.search.per_page = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.search.action_prefix = "apos-search".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.search.action_prefix = "/apos-search/".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.search.filters = FiltersSetting::Custom(vec![
            SearchFilter::new("news", "News"),
            SearchFilter::new("news", "More News"),
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_load_disabled_filters_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nper_page = 25\nfilters = false").unwrap();

        let config = AppConfig::load_from(Some(file.path())).expect("Should load file configuration");

        assert_eq!(config.search.per_page, 25);
        assert_eq!(config.search.filters, FiltersSetting::Enabled(false));
        assert_eq!(config.search.action_prefix, "/apos-search");
    }

    #[test]
    fn test_invalid_file_surfaces_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nper_page = 0").unwrap();

        let err = AppConfig::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("per_page"));
    }

    #[test]
    fn test_load_custom_filters_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nfilters = [{{ name = \"news\", label = \"News\" }}, {{ name = \"other\", label = \"Everything else\" }}]"
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).expect("Should load file configuration");

        match config.search.filters {
            FiltersSetting::Custom(filters) => {
                let names: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, vec!["news", "other"]);
                assert!(filters.iter().all(|f| !f.active));
            }
            other => panic!("expected custom filters, got {:?}", other),
        }
    }
}
