//! Route table

use crate::{
    handlers::{health::handle_health, pages::handle_page, search::handle_search_result},
    AppState,
};
use axum::{routing::get, Router};

pub fn create_routes(result_route: &str) -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .route(result_route, get(handle_search_result))
        .fallback(handle_page)
}
