use crate::{ApiError, ApiResult, AppState};
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use kaspa_lens_base::NftMarket;
use kaspa_lens_client::krc721::Holding;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Deserialize, Debug)]
pub struct AddressQuery {
    address: Option<String>,
}

impl AddressQuery {
    fn address(&self) -> ApiResult<&str> {
        self.address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or(ApiError::MissingParam("address"))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NftHolding {
    pub id: String,
    pub name: String,
    pub collection: String,
    pub value: f64,
    pub image: String,
}

#[tracing::instrument(skip(state))]
pub async fn transactions(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    let address = query.address()?;

    let transactions = state
        .upstreams
        .kaspa
        .all_address_transactions(address)
        .await
        .context("Failed to fetch data from Kaspa API")?;

    tracing::debug!(count = transactions.len(), "transactions fetched");
    Ok(Json(transactions))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    block_hash: Option<String>,
}

#[tracing::instrument(skip(state))]
pub async fn transaction(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<Json<Value>> {
    let block_hash = query.block_hash.as_deref().filter(|h| !h.is_empty());
    let transaction = state.upstreams.kaspa.transaction(&hash, block_hash).await?;

    Ok(Json(transaction))
}

#[tracing::instrument(skip(state))]
pub async fn nft_holdings(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<Json<Vec<NftHolding>>> {
    let address = query.address()?;
    let krc721 = &state.upstreams.krc721;

    let holdings = krc721.address_holdings(address).await?;

    // 地板价取不到时按 0 处理
    let markets = krc721.markets().await.unwrap_or_else(|e| {
        tracing::warn!("nft markets unavailable: {}", e);
        HashMap::new()
    });

    let holdings = join_holdings(holdings, &markets, |tick, id| krc721.thumbnail_url(tick, id));
    Ok(Json(holdings))
}

fn join_holdings(
    holdings: Vec<Holding>,
    markets: &HashMap<String, NftMarket>,
    image_url: impl Fn(&str, &str) -> String,
) -> Vec<NftHolding> {
    holdings
        .into_iter()
        .map(|holding| NftHolding {
            name: format!("{} #{}", holding.tick, holding.token_id),
            value: markets
                .get(&holding.tick)
                .map(|m| m.floor_price)
                .unwrap_or(0.0),
            image: image_url(&holding.tick, &holding.token_id),
            collection: holding.tick,
            id: holding.token_id,
        })
        .collect()
}
