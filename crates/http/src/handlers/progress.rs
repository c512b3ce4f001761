use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use schatzkarte_core::{ModuleId, ProgressFlag};

use crate::api_error::ApiError;
use crate::blocking::blocking_json;
use crate::query_types::{AchieveGoalRequest, SetFlagRequest, SetGoalRequest};
use crate::response_types::{FlagResponse, GoalResponse, OkResponse};
use crate::AppState;

pub async fn set_flag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFlagRequest>,
) -> Result<Json<FlagResponse>, ApiError> {
    let flag: ProgressFlag = req.flag.parse()?;
    let progress_service = state.progress_service.clone();
    blocking_json(move || {
        let module = ModuleId::from(req.module);
        let changed = progress_service.set_flag(&req.user, &module, flag, Utc::now())?;
        Ok(FlagResponse { changed })
    })
    .await
}

pub async fn set_goal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetGoalRequest>,
) -> Result<Json<GoalResponse>, ApiError> {
    let progress_service = state.progress_service.clone();
    blocking_json(move || {
        let goal_id = progress_service.set_goal(&req.user, &req.title, Utc::now())?;
        Ok(GoalResponse { goal_id })
    })
    .await
}

pub async fn achieve_goal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AchieveGoalRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let progress_service = state.progress_service.clone();
    blocking_json(move || {
        progress_service.achieve_goal(&req.user, &req.goal, Utc::now())?;
        Ok(OkResponse { success: true })
    })
    .await
}
