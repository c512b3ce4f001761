use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use schatzkarte_core::Catalog;
use schatzkarte_service::MapView;

use crate::api_error::ApiError;
use crate::blocking::blocking_json;
use crate::query_types::{resolve_week, MapQuery};
use crate::AppState;

pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Result<Json<MapView>, ApiError> {
    let week = resolve_week(
        query.week,
        query.all_open,
        query.start_date,
        Utc::now().date_naive(),
    )?;
    let map_service = state.map_service.clone();
    blocking_json(move || Ok(map_service.map_view(&query.user, week)?)).await
}

pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}
