use crate::{market::reload_tokens, ApiError, ApiResult, AppState, LoadProgress};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use kaspa_lens_base::{pipeline::DEFAULT_PAGE_SIZE, ExchangeName, Listing, Page, Ticker};
use kaspa_lens_market::{
    aggregator::{filter_by_ticker, SelectedQuote},
    AggregatorFilter, CombinedMarketRow,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageQuery {
    min_volume: Option<f64>,
    #[serde(default)]
    ignore_zero_volume: bool,
    // 逗号分隔
    hidden: Option<String>,
    ticker: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

impl ArbitrageQuery {
    fn filter(&self) -> AggregatorFilter {
        let hidden_exchanges = self
            .hidden
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ExchangeName::from)
            .collect();

        AggregatorFilter {
            min_volume_usd: self.min_volume.unwrap_or(0.0),
            ignore_zero_volume: self.ignore_zero_volume,
            hidden_exchanges,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageRow {
    #[serde(flatten)]
    pub row: CombinedMarketRow,
    pub displayed_spread: f64,
    pub favorite: bool,
    // 本行中被手动选中的交易所
    pub selected_exchanges: Vec<ExchangeName>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageResponse {
    pub rows: Page<ArbitrageRow>,
    pub available_exchanges: Vec<ExchangeName>,
    pub progress: Option<LoadProgress>,
    pub loaded_at: Option<String>,
    pub selected: Vec<SelectedQuote>,
    pub selected_spread: Option<f64>,
}

#[tracing::instrument(skip(state))]
pub async fn arbitrage(
    State(state): State<AppState>,
    Query(query): Query<ArbitrageQuery>,
) -> ApiResult<Json<ArbitrageResponse>> {
    let filter = query.filter();
    let favorites: BTreeSet<String> = state.prefs.get().await.favorite_tickers;
    let market = state.market.read().await;

    let mut rows = filter.combine(&market.tokens);
    if let Some(needle) = query.ticker.as_deref().filter(|t| !t.is_empty()) {
        rows = filter_by_ticker(rows, needle);
    }

    let page = Listing::new()
        .page(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .apply(rows)
        .map(|row| ArbitrageRow {
            displayed_spread: market.selection.displayed_spread(&row),
            favorite: favorites.contains(row.ticker.as_ref()),
            selected_exchanges: row
                .markets
                .iter()
                .filter(|quote| market.selection.is_selected(&row.ticker, &quote.exchange_name))
                .map(|quote| quote.exchange_name.clone())
                .collect(),
            row,
        });

    Ok(Json(ArbitrageResponse {
        rows: page,
        available_exchanges: filter.available_exchanges(&market.tokens),
        progress: market.progress,
        loaded_at: market.loaded_at.map(|at| at.to_rfc3339()),
        selected: market.selection.selected().cloned().collect(),
        selected_spread: market.selection.selected_spread(),
    }))
}

// 后台重新加载，立即返回
#[tracing::instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    tokio::spawn(async move {
        if let Err(e) = reload_tokens(state).await {
            tracing::error!("token reload failed: {:#}", e);
        }
    });

    (StatusCode::ACCEPTED, Json(json!({ "success": true })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SelectBody {
    ticker: String,
    exchange_name: String,
}

#[tracing::instrument(skip(state))]
pub async fn select(
    State(state): State<AppState>,
    Json(body): Json<SelectBody>,
) -> ApiResult<Json<Value>> {
    let ticker = Ticker::new(body.ticker);
    let exchange_name = ExchangeName::new(body.exchange_name);
    let mut market = state.market.write().await;

    let price = market
        .tokens
        .iter()
        .filter(|token| token.ticker == ticker)
        .flat_map(|token| &token.markets)
        .find(|quote| quote.exchange_name == exchange_name)
        .map(|quote| quote.price_usd)
        .ok_or_else(|| ApiError::BadRequest(format!("no {} quote on {}", ticker, exchange_name)))?;

    let selected = market.selection.toggle(ticker, exchange_name, price);

    Ok(Json(json!({
        "selected": selected,
        "selection": market.selection.selected().collect::<Vec<_>>(),
        "selectedSpread": market.selection.selected_spread(),
    })))
}

#[tracing::instrument(skip(state))]
pub async fn clear_selection(State(state): State<AppState>) -> Json<Value> {
    state.market.write().await.selection.clear();
    Json(json!({ "success": true }))
}

#[tracing::instrument(skip(state))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Json<Value>> {
    let favorite = state.prefs.toggle_favorite(&ticker).await?;
    Ok(Json(json!({ "ticker": ticker, "favorite": favorite })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{router, test_support::*};
    use kaspa_lens_base::{MarketQuote, Token};

    fn quote(exchange: &str, price: f64, volume: f64) -> MarketQuote {
        MarketQuote::builder()
            .exchange_name(exchange)
            .price_usd(price)
            .volume_usd(volume)
            .build()
    }

    async fn seeded_state() -> AppState {
        let state = test_state().await;
        state.market.write().await.tokens = vec![
            Token::new(
                "NACHO",
                vec![
                    quote("MEXC", 1.0, 1000.0),
                    quote("KaspaCom", 1.5, 500.0),
                    quote("Xeggex", 3.0, 50.0),
                ],
            ),
            Token::new(
                "KASPY",
                vec![quote("MEXC", 2.0, 1000.0), quote("Chainge", 2.2, 0.0)],
            ),
            Token::new("SOLO", vec![quote("MEXC", 1.0, 1000.0)]),
        ];
        state
    }

    #[tokio::test]
    async fn test_arbitrage_rows() -> anyhow::Result<()> {
        let app = router(seeded_state().await);
        let (status, body) = send(app, get("/api/arbitrage")?).await?;

        assert_eq!(status, StatusCode::OK);
        let rows = body["rows"]["items"].as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ticker"], "NACHO");
        assert_eq!(rows[0]["maxSpreadPercent"], 200.0);
        assert_eq!(rows[0]["markets"][0]["tag"], "BUY");
        assert_eq!(rows[0]["markets"][1]["krc20Market"], true);
        assert_eq!(rows[1]["ticker"], "KASPY");
        assert_eq!(body["rows"]["total"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_arbitrage_volume_filters() -> anyhow::Result<()> {
        let app = router(seeded_state().await);
        let (_, body) = send(
            app,
            get("/api/arbitrage?minVolume=100&ignoreZeroVolume=true&hidden=Xeggex")?,
        )
        .await?;

        let rows = body["rows"]["items"].as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ticker"], "NACHO");
        assert_eq!(rows[0]["maxSpreadPercent"], 50.0);
        assert_eq!(body["availableExchanges"], json!(["MEXC", "KaspaCom"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_arbitrage_ticker_and_paging() -> anyhow::Result<()> {
        let state = seeded_state().await;

        let (_, body) = send(router(state.clone()), get("/api/arbitrage?ticker=asp")?).await?;
        assert_eq!(body["rows"]["total"], 1);
        assert_eq!(body["rows"]["items"][0]["ticker"], "KASPY");

        let (_, body) = send(router(state), get("/api/arbitrage?page=2&pageSize=1")?).await?;
        assert_eq!(body["rows"]["totalPages"], 2);
        assert_eq!(body["rows"]["items"][0]["ticker"], "KASPY");
        Ok(())
    }

    #[tokio::test]
    async fn test_selected_pair_overrides_spread() -> anyhow::Result<()> {
        let state = seeded_state().await;

        for exchange in ["MEXC", "KaspaCom"] {
            let (status, _) = send(
                router(state.clone()),
                post_json(
                    "/api/arbitrage/select",
                    json!({"ticker": "NACHO", "exchangeName": exchange}),
                )?,
            )
            .await?;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(router(state), get("/api/arbitrage")?).await?;
        assert_eq!(body["selectedSpread"], 50.0);
        assert_eq!(body["rows"]["items"][0]["displayedSpread"], 50.0);
        assert_eq!(body["rows"]["items"][0]["selectedExchanges"], json!(["MEXC", "KaspaCom"]));
        assert_eq!(body["rows"]["items"][1]["displayedSpread"], body["rows"]["items"][1]["maxSpreadPercent"]);
        assert_eq!(body["rows"]["items"][1]["selectedExchanges"], json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_selection() -> anyhow::Result<()> {
        let state = seeded_state().await;
        send(
            router(state.clone()),
            post_json(
                "/api/arbitrage/select",
                json!({"ticker": "KASPY", "exchangeName": "MEXC"}),
            )?,
        )
        .await?;

        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/api/arbitrage/select")
            .body(axum::body::Body::empty())?;
        let (status, _) = send(router(state.clone()), request).await?;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(router(state), get("/api/arbitrage?ticker=KASPY")?).await?;
        assert_eq!(body["selected"], json!([]));
        assert_eq!(body["rows"]["items"][0]["selectedExchanges"], json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_select_unknown_quote() -> anyhow::Result<()> {
        let app = router(seeded_state().await);
        let (status, _) = send(
            app,
            post_json(
                "/api/arbitrage/select",
                json!({"ticker": "NACHO", "exchangeName": "Nowhere"}),
            )?,
        )
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_favorite_flag() -> anyhow::Result<()> {
        let state = seeded_state().await;

        let (_, body) = send(router(state.clone()), post_json("/api/favorites/KASPY", json!({}))?).await?;
        assert_eq!(body["favorite"], true);

        let (_, body) = send(router(state), get("/api/arbitrage?ticker=KASPY")?).await?;
        assert_eq!(body["rows"]["items"][0]["favorite"], true);
        Ok(())
    }
}
