use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use mindquest_core::progression::ProgressionInfo;
use mindquest_core::rewards::{
    AwardEvent, AwardParams, PatientAction, PatientProgression, TaskPriority,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AwardRequest {
    action: String,
    priority: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedemptionRequest {
    amount: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatientProgressionResponse {
    progression: PatientProgression,
    info: ProgressionInfo,
}

async fn register_patient(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PatientProgression>> {
    let progression = state.reward_service.register_patient(&id).await?;
    Ok(Json(progression))
}

async fn get_progression(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PatientProgressionResponse>> {
    let progression = state.reward_service.get_progression(&id)?;
    let info = state.reward_service.get_progression_info(&id)?;
    Ok(Json(PatientProgressionResponse { progression, info }))
}

async fn award(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AwardRequest>,
) -> ApiResult<Json<AwardEvent>> {
    let action: PatientAction = body.action.parse()?;
    let params = match body.priority.as_deref() {
        Some(p) => AwardParams::with_priority(p.parse::<TaskPriority>()?),
        None => AwardParams::default(),
    };
    let event = state.reward_service.award(&id, action, params).await?;
    Ok(Json(event))
}

async fn redeem(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RedemptionRequest>,
) -> ApiResult<Json<PatientProgression>> {
    let progression = state.reward_service.redeem_coins(&id, body.amount).await?;
    Ok(Json(progression))
}

async fn reset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PatientProgression>> {
    let progression = state.reward_service.reset_progression(&id).await?;
    Ok(Json(progression))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/patients/{id}", post(register_patient))
        .route("/patients/{id}/progression", get(get_progression))
        .route("/patients/{id}/awards", post(award))
        .route("/patients/{id}/redemptions", post(redeem))
        .route("/patients/{id}/reset", post(reset))
}
