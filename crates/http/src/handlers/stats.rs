use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use schatzkarte_core::UserStats;

use crate::api_error::ApiError;
use crate::blocking::blocking_json;
use crate::query_types::ActivityRequest;
use crate::AppState;

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    let progress_service = state.progress_service.clone();
    blocking_json(move || Ok(progress_service.get_stats(&user)?)).await
}

pub async fn recompute_stats(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    let progress_service = state.progress_service.clone();
    blocking_json(move || Ok(progress_service.recompute_stats(&user)?)).await
}

pub async fn record_activity(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActivityRequest>,
) -> Result<Json<UserStats>, ApiError> {
    let today = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let progress_service = state.progress_service.clone();
    blocking_json(move || Ok(progress_service.record_activity(&req.user, today)?)).await
}
