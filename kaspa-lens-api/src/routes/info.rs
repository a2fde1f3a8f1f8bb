use crate::{ApiResult, AppState};
use axum::{extract::State, response::Json};
use serde_json::Value;

pub async fn market_data(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.upstreams.kaspa.market_data().await?))
}

pub async fn blockdag(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.upstreams.kaspa.blockdag().await?))
}
