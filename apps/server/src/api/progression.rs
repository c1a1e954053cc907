use axum::{extract::Query, routing::get, Json, Router};
use mindquest_core::progression::{ActorKind, ProgressionInfo};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct InfoQuery {
    xp: i64,
    population: Option<ActorKind>,
}

/// Level projection for an arbitrary XP total, without touching storage.
async fn get_info(Query(query): Query<InfoQuery>) -> ApiResult<Json<ProgressionInfo>> {
    if query.xp < 0 {
        return Err(ApiError::BadRequest("xp must not be negative".to_string()));
    }
    let curve = query.population.unwrap_or(ActorKind::Patient).curve();
    Ok(Json(curve.info(query.xp)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/progression/info", get(get_info))
}
