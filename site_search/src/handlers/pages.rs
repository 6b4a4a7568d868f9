//! Page serving: exact-match lookup, then the search loader gets a look

use crate::{
    error::{AppError, Result},
    models::response::ApiResponse,
    search::{LoaderOutcome, RequestQuery, SearchRequest},
    AppState,
};
use axum::{
    extract::{Query, State},
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use tracing::debug;

pub async fn handle_page(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let path = uri.path().to_string();
    let page = state.store.get_page(&path).await?;
    debug!("Serving {} (exact page match: {})", path, page.is_some());

    let request = SearchRequest::new(path, page, RequestQuery::from(params));

    match state.search.loader.load(&request).await {
        LoaderOutcome::Rendered(view) => Ok(Json(ApiResponse::success(view)).into_response()),
        LoaderOutcome::NotFound => Err(AppError::NotFound(format!(
            "No search results page at {}",
            request.path
        ))),
        LoaderOutcome::Failed => Err(AppError::InternalServerError),
        LoaderOutcome::NotApplicable => match request.page {
            Some(page) => Ok(Json(ApiResponse::success(page)).into_response()),
            None => Err(AppError::NotFound(format!("Page {} not found", request.path))),
        },
    }
}
