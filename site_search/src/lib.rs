//! Site search for a content-managed website: a search results page with
//! toggleable type filters and pagination, plus click-time resolution of
//! search results to their live location.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod sanitize;
pub mod search;
pub mod store;

pub use crate::config::{AppConfig, FiltersSetting, SearchConfig};
pub use error::{AppError, Result, StoreError};
pub use handlers::routes::create_routes;
pub use sanitize::{Sanitizer, StandardSanitizer};
pub use search::{
    Criteria, HandlerOutcome, LoaderOutcome, Pager, PagerState, RequestQuery, ResultRequest,
    SearchFilter, SearchLoader, SearchModule, SearchModuleBuilder, SearchRequest,
    SearchResultHandler, SearchView,
};
pub use store::{ContentStore, MemoryStore, Page, SearchResults};

use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub store: Arc<dyn ContentStore>,
    pub search: SearchModule,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, search: SearchModule) -> Self {
        Self {
            app_name: "Site Search".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
            search,
        }
    }

    /// State backed by `store` with no extensions registered.
    pub fn with_store(store: Arc<dyn ContentStore>, config: &SearchConfig) -> Self {
        let search = SearchModule::builder(config.clone()).bridge(store.clone());
        Self::new(store, search)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_store(
            Arc::new(MemoryStore::with_sample_content()),
            &SearchConfig::default(),
        )
    }
}

pub fn create_app(state: AppState) -> Router {
    let router = create_routes(&state.search.result_route());

    middleware::logging::with_request_tracing(router).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
