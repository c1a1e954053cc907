use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use mindquest_core::practice::{EntryKind, FinancialEntry, SessionRecord, SessionStatus};
use mindquest_core::progression::ProgressionInfo;
use mindquest_core::rewards::AwardEvent;
use mindquest_core::therapists::{TherapistAction, TherapistProgression};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TherapistAwardRequest {
    action: String,
    multiplier: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TherapistProgressionResponse {
    progression: TherapistProgression,
    info: ProgressionInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionInput {
    id: String,
    patient_id: String,
    scheduled_at: DateTime<Utc>,
    status: SessionStatus,
    price: Option<Decimal>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerEntryInput {
    id: String,
    kind: EntryKind,
    amount: Decimal,
    occurred_at: DateTime<Utc>,
}

async fn get_progression(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TherapistProgressionResponse>> {
    let progression = state.therapist_service.get_therapist_progression(&id).await?;
    let info = state
        .therapist_service
        .get_therapist_progression_info(&id)
        .await?;
    Ok(Json(TherapistProgressionResponse { progression, info }))
}

async fn award(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<TherapistAwardRequest>,
) -> ApiResult<Json<AwardEvent>> {
    let action: TherapistAction = body.action.parse()?;
    let event = state
        .therapist_service
        .award_therapist(&id, action, body.multiplier.unwrap_or(1))
        .await?;
    Ok(Json(event))
}

async fn record_session(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionInput>,
) -> ApiResult<StatusCode> {
    state
        .practice_repository
        .record_session(SessionRecord {
            id: body.id,
            therapist_id: id,
            patient_id: body.patient_id,
            scheduled_at: body.scheduled_at,
            status: body.status,
            price: body.price,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn record_ledger_entry(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<LedgerEntryInput>,
) -> ApiResult<StatusCode> {
    state
        .practice_repository
        .record_financial_entry(FinancialEntry {
            id: body.id,
            therapist_id: id,
            kind: body.kind,
            amount: body.amount,
            occurred_at: body.occurred_at,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/therapists/{id}/progression", get(get_progression))
        .route("/therapists/{id}/awards", post(award))
        .route("/therapists/{id}/sessions", post(record_session))
        .route("/therapists/{id}/ledger", post(record_ledger_entry))
}
