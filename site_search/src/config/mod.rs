pub mod settings;

pub use settings::{AppConfig, FiltersSetting, SearchConfig, ServerConfig};
