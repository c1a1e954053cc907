use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use mindquest_core::goals::{Goal, GoalCategory, GoalRecalculation, NewGoal};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGoalRequest {
    id: Option<String>,
    title: String,
    category: GoalCategory,
    unit: String,
    target_value: f64,
    deadline: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct RecalculateQuery {
    category: Option<GoalCategory>,
}

async fn get_goals(
    Path(owner_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.get_goals(&owner_id)?;
    Ok(Json(goals))
}

async fn create_goal(
    Path(owner_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state
        .goal_service
        .create_goal(NewGoal {
            id: body.id,
            owner_id,
            title: body.title,
            category: body.category,
            unit: body.unit,
            target_value: body.target_value,
            deadline: body.deadline,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.get_goal(&id)?))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.goal_service.delete_goal(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn recalculate_goals(
    Path(owner_id): Path<String>,
    Query(query): Query<RecalculateQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<GoalRecalculation>>> {
    let results = match query.category {
        Some(category) => {
            state
                .goal_service
                .recalculate_goals_by_category(&owner_id, category)
                .await?
        }
        None => state.goal_service.recalculate_all_goals(&owner_id).await?,
    };
    Ok(Json(results))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/owners/{id}/goals", get(get_goals).post(create_goal))
        .route("/owners/{id}/goals/recalculate", post(recalculate_goals))
        .route("/goals/{id}", get(get_goal).delete(delete_goal))
}
