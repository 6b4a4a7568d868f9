//! Main entry point for the HTTP server binary

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use site_search::{
    create_app, run_server, AppConfig, AppState, ContentStore, HandlerOutcome, MemoryStore, Page,
    ResultRequest, SearchFilter, SearchModule, SearchResultHandler,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sends people results to their directory entry.
struct PeopleDirectory;

#[async_trait]
impl SearchResultHandler for PeopleDirectory {
    async fn handle(&self, _request: &ResultRequest, page: &Page) -> HandlerOutcome {
        if page.page_type != "person" {
            return HandlerOutcome::Declined;
        }
        let location = format!("/people/{}", page.slug);
        HandlerOutcome::Accepted((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    info!("Initializing site search server");
    info!("Environment: {}", std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()));

    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::with_sample_content());

    let search = SearchModule::builder(config.search.clone())
        .on_unsearchable(|types: &mut Vec<String>| types.push("trash".to_string()))
        .on_add_search_filters(|filters: &mut Vec<SearchFilter>| {
            filters.push(SearchFilter::new("news", "News"));
            filters.push(SearchFilter::new("event", "Events"));
        })
        .on_search_result(PeopleDirectory)
        .bridge(store.clone());

    info!("Search results resolve through {}", search.result_route());

    let state = AppState::new(store, search);
    info!("App: {} v{}", state.app_name, state.version);

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!(
                "{}={},site_search={},tower_http=debug,axum=debug",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                default_level,
                default_level
            ).into()
        });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
