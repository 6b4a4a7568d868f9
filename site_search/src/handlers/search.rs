//! Click-time redirect endpoint for search results

use crate::{
    search::{RequestQuery, ResultRequest},
    AppState,
};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::info;

pub async fn handle_search_result(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let query = RequestQuery::from(params);
    let slug = query.get("slug").unwrap_or_default().to_string();
    info!("GET {} - slug: {}", state.search.result_route(), slug);

    let request = ResultRequest {
        slug,
        query,
        headers,
    };

    state.search.resolver.resolve(&request).await.into_response()
}
