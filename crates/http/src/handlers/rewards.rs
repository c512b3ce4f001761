use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use schatzkarte_core::ModuleId;
use schatzkarte_service::CollectOutcome;

use crate::api_error::ApiError;
use crate::blocking::blocking_json;
use crate::query_types::{resolve_week, CollectRequest};
use crate::AppState;

pub async fn collect_reward(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CollectRequest>,
) -> Result<Json<CollectOutcome>, ApiError> {
    let now = Utc::now();
    let week = resolve_week(req.week, req.all_open, req.start_date, now.date_naive())?;
    let reward_service = state.reward_service.clone();
    blocking_json(move || {
        let module = ModuleId::from(req.module);
        Ok(reward_service.collect_reward(&req.user, &module, &req.reward, week, now)?)
    })
    .await
}
