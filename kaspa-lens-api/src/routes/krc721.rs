use crate::{ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Json,
};
use kaspa_lens_base::{MintedToken, NewMintsCollection, NftCollection, Page, RecentMint};
use kaspa_lens_client::{collect_all_pages, krc721::COLLECTIONS_PAGE_SIZE};
use kaspa_lens_market::{collections::join_collections, CollectionTab, TokenGrid};
use serde::Deserialize;
use serde_json::{json, Value};

#[tracing::instrument(skip(state))]
pub async fn holders(
    State(state): State<AppState>,
    Path(tick): Path<String>,
) -> ApiResult<Json<Value>> {
    let data = state.upstreams.kaspacom.krc721_holders(&tick).await?;
    Ok(Json(data))
}

#[derive(Deserialize, Debug, Default)]
pub struct NewMintsQuery {
    #[serde(alias = "TICK")]
    tick: Option<String>,
    limit: Option<usize>,
    all: Option<bool>,
    search: Option<String>,
}

#[tracing::instrument(skip(state))]
pub async fn new_mints(
    State(state): State<AppState>,
    Query(query): Query<NewMintsQuery>,
) -> ApiResult<Json<Value>> {
    let response = state
        .upstreams
        .new_mints
        .collections::<NewMintsCollection>(query.tick.as_deref(), query.limit, query.all)
        .await?;

    let data = state
        .mints
        .lock()
        .await
        .collections(response.data, query.search.as_deref());

    Ok(Json(json!({
        "success": true,
        "data": data,
        "count": response.count,
    })))
}

#[derive(Deserialize, Debug, Default)]
struct ScanBody {
    tick: Option<String>,
}

// 请求体可以为空或不是 JSON
fn scan_tick(body: &Bytes) -> Option<String> {
    serde_json::from_slice::<ScanBody>(body)
        .unwrap_or_default()
        .tick
        .filter(|t| !t.is_empty())
}

#[tracing::instrument(skip(state, body))]
pub async fn scan_and_list(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let tick = scan_tick(&body);
    let client = &state.upstreams.new_mints;

    let scan_result = client.scan(tick.as_deref()).await?;
    let mints = client
        .recent_mints::<Value>(tick.as_deref(), None)
        .await?;

    Ok(Json(json!({
        "success": true,
        "scanResult": scan_result,
        "newMints": mints.data,
        "count": mints.count,
    })))
}

#[derive(Deserialize, Debug)]
pub struct RecentQuery {
    tick: Option<String>,
    limit: Option<usize>,
}

#[tracing::instrument(skip(state))]
pub async fn recent_mints(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Value>> {
    let mints = state
        .upstreams
        .new_mints
        .recent_mints::<Value>(query.tick.as_deref(), query.limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": mints.data,
        "count": mints.count,
    })))
}

#[tracing::instrument(skip(state, body))]
pub async fn scan(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let tick = scan_tick(&body);
    let scan_result = state.upstreams.new_mints.scan(tick.as_deref()).await?;

    Ok(Json(json!({ "success": true, "scanResult": scan_result })))
}

// 轮询最近铸造，只返回关注集合中新出现的
#[tracing::instrument(skip(state))]
pub async fn watch_mints(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let mints = state
        .upstreams
        .new_mints
        .recent_mints::<RecentMint>(None, None)
        .await?;

    let fresh = state.mints.lock().await.observe(&mints.data);
    if !fresh.is_empty() {
        tracing::info!(count = fresh.len(), "new mints in watched collections");
    }

    Ok(Json(json!({
        "success": true,
        "newMints": fresh,
        "count": fresh.len(),
    })))
}

#[tracing::instrument(skip(state))]
pub async fn toggle_watched(
    State(state): State<AppState>,
    Path(tick): Path<String>,
) -> ApiResult<Json<Value>> {
    let watched = state.prefs.toggle_watched(&tick).await?;
    let all = state.prefs.get().await.watched_collections;
    state.mints.lock().await.set_watched(all);

    Ok(Json(json!({ "tick": tick, "watched": watched })))
}

#[derive(Deserialize, Debug)]
pub struct CollectionsQuery {
    #[serde(default, alias = "sort")]
    tab: CollectionTab,
    search: Option<String>,
    page: Option<usize>,
}

#[tracing::instrument(skip(state))]
pub async fn collections(
    State(state): State<AppState>,
    Query(query): Query<CollectionsQuery>,
) -> ApiResult<Json<Page<NftCollection>>> {
    let krc721 = &state.upstreams.krc721;

    let markets = krc721.markets().await?;
    let deployments =
        collect_all_pages(COLLECTIONS_PAGE_SIZE, 1, |offset| krc721.collections(offset)).await?;

    let rows = join_collections(&markets, deployments, |tick| krc721.thumbnail_url(tick, 1));
    let page = query
        .tab
        .listing(query.search.as_deref())
        .page(query.page.unwrap_or(1), kaspa_lens_market::collections::TOP_COLLECTIONS)
        .apply(rows);

    Ok(Json(page))
}

#[derive(Deserialize, Debug)]
pub struct TokensQuery {
    page: Option<usize>,
    #[serde(default)]
    minted: bool,
}

#[tracing::instrument(skip(state))]
pub async fn collection_tokens(
    State(state): State<AppState>,
    Path(tick): Path<String>,
    Query(query): Query<TokensQuery>,
) -> ApiResult<Json<Page<MintedToken>>> {
    let response = state
        .upstreams
        .new_mints
        .collections::<NewMintsCollection>(Some(&tick), None, None)
        .await?;

    let grid = match response.data.into_iter().find(|c| c.tick.as_ref() == tick) {
        Some(collection) => TokenGrid::new(Some(collection.total_supply), collection.minted_ids),
        None => {
            tracing::debug!(%tick, "collection not tracked, using fallback supply");
            TokenGrid::new(None, std::iter::empty())
        }
    };

    let krc721 = &state.upstreams.krc721;
    let page = grid.page(query.page.unwrap_or(1), query.minted, |id| {
        krc721.thumbnail_url(&tick, id)
    });

    Ok(Json(page))
}
