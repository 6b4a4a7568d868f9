//! Liveness endpoint

use crate::{models::response::ApiResponse, AppState};
use axum::{extract::State, response::IntoResponse, Json};

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "app": state.app_name,
        "version": state.version,
        "search_page_type": state.search.loader.page_type(),
        "per_page": state.search.loader.pager().per_page(),
    })))
}
