use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};

const TOKENS_CACHE_CONTROL: &str = "s-maxage=60, stale-while-revalidate";
const DEFAULT_TIME_RANGE: &str = "1d";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TickerQuery {
    ticker: Option<String>,
    time_range: Option<String>,
}

impl TickerQuery {
    fn ticker(&self) -> ApiResult<&str> {
        self.ticker
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ApiError::MissingParam("ticker"))
    }
}

// changePrice 复制为 change24h，缺失时为 0
fn with_change_24h(mut token: Value) -> Value {
    let change = token.get("changePrice").cloned().unwrap_or(json!(0));

    if let Value::Object(fields) = &mut token {
        fields.insert("change24h".to_string(), change);
    }

    token
}

#[tracing::instrument(skip(state))]
pub async fn krc20_tokens(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let tokens = state.upstreams.kaspacom.krc20_tokens().await?;
    let tokens: Vec<Value> = tokens.into_iter().map(with_change_24h).collect();

    Ok((
        [(header::CACHE_CONTROL, TOKENS_CACHE_CONTROL)],
        Json(tokens),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn token_info(
    State(state): State<AppState>,
    Query(query): Query<TickerQuery>,
) -> ApiResult<Json<Value>> {
    let ticker = query.ticker()?;
    let data = state.upstreams.kasfyi.token_info(ticker).await?;

    Ok(Json(json!({ "success": true, "data": data })))
}

#[tracing::instrument(skip(state))]
pub async fn chart_data(
    State(state): State<AppState>,
    Query(query): Query<TickerQuery>,
) -> ApiResult<Json<Value>> {
    let ticker = query.ticker()?;
    let interval = query.time_range.as_deref().unwrap_or(DEFAULT_TIME_RANGE);
    let data = state.upstreams.kasfyi.candles(ticker, interval).await?;

    shape_candles(data).map(Json)
}

fn shape_candles(data: Value) -> ApiResult<Value> {
    match data.get("candles") {
        Some(Value::Array(candles)) if candles.is_empty() => Ok(json!({
            "success": true,
            "candles": [],
            "message": "No candle data available for this ticker and time range",
        })),
        Some(Value::Array(_)) => Ok(data),
        _ => Err(ApiError::Internal(anyhow::anyhow!(
            "Invalid data format received from API"
        ))),
    }
}
