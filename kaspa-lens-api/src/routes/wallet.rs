use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, response::Json};
use kaspa_lens_base::{Network, Sompi, Ticker};
use kaspa_lens_market::{AirdropEntry, AirdropOutcome, AirdropPlan};
use kaspa_lens_wallet::{WalletError, WalletSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub async fn snapshot(State(state): State<AppState>) -> ApiResult<Json<WalletSnapshot>> {
    Ok(Json(state.wallet.snapshot().await?))
}

#[tracing::instrument(skip(state))]
pub async fn connect(State(state): State<AppState>) -> ApiResult<Json<WalletSnapshot>> {
    Ok(Json(state.wallet.connect().await?))
}

#[tracing::instrument(skip(state))]
pub async fn disconnect(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.wallet.disconnect().await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize, Debug)]
pub struct SwitchBody {
    network: Network,
}

#[tracing::instrument(skip(state))]
pub async fn switch_network(
    State(state): State<AppState>,
    Json(body): Json<SwitchBody>,
) -> ApiResult<Json<WalletSnapshot>> {
    Ok(Json(state.wallet.switch_network(body.network).await?))
}

pub async fn refresh(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.wallet.refresh()?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize, Debug)]
pub struct AirdropBody {
    ticker: String,
    // 与 entries 二选一
    csv: Option<String>,
    entries: Option<Vec<AirdropEntry>>,
}

impl AirdropBody {
    fn into_plan(self) -> ApiResult<AirdropPlan> {
        let ticker = Ticker::clean(&self.ticker).ok_or(ApiError::MissingParam("ticker"))?;

        let plan = match (self.csv, self.entries) {
            (Some(csv), _) => AirdropPlan::from_csv(ticker, &csv)?,
            (None, Some(entries)) => AirdropPlan::new(ticker, entries)?,
            (None, None) => return Err(ApiError::MissingParam("entries")),
        };

        Ok(plan)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AirdropCheck {
    pub ticker: Ticker,
    pub recipients: usize,
    pub total_required: Decimal,
    pub outcome: AirdropOutcome,
    // 仅 KAS 空投，按 sompi 计
    pub transfers: Vec<Transfer>,
}

#[derive(Serialize, Debug)]
pub struct Transfer {
    pub address: String,
    pub amount: Sompi,
}

#[tracing::instrument(skip(state, body))]
pub async fn airdrop_check(
    State(state): State<AppState>,
    Json(body): Json<AirdropBody>,
) -> ApiResult<Json<AirdropCheck>> {
    let plan = body.into_plan()?;

    let wallet = state.wallet.snapshot().await?;
    let address = match (&wallet.address, wallet.connected) {
        (Some(address), true) => address.clone(),
        _ => return Err(WalletError::not_connected().into()),
    };

    let outcome = plan
        .check_balance(&address, wallet.balance_sompi, &state.upstreams.kasplex)
        .await?;

    let transfers = if plan.is_kas() {
        plan.kas_transfers()
            .into_iter()
            .map(|(address, amount)| Transfer { address, amount })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Json(AirdropCheck {
        recipients: plan.entries.len(),
        total_required: plan.total_required(),
        ticker: plan.ticker,
        outcome,
        transfers,
    }))
}
