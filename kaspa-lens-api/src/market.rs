use crate::{state::ARBITRAGE_TARGET, AppState, LoadProgress};
use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use kaspa_lens_base::RecentMint;
use kaspa_lens_market::{LoadEvent, LoadReport, TokenLoader};
use serde_json::Value;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

// 未配置代币列表时使用 kaspa.com 的 KRC-20 列表
pub async fn market_tickers(state: &AppState) -> Result<Vec<String>> {
    if !state.setting.market.tickers.is_empty() {
        return Ok(state.setting.market.tickers.clone());
    }

    let listing = state.upstreams.kaspacom.krc20_tokens().await?;
    Ok(tickers_from_listing(&listing))
}

fn tickers_from_listing(listing: &[Value]) -> Vec<String> {
    listing
        .iter()
        .filter_map(|token| token.get("ticker").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// 重新加载套利视图的代币集合。后发起的加载会使先前的加载失效，
/// 失效的加载返回 `None` 且不再修改状态。
#[tracing::instrument(skip(state), fields(load_id = tracing::field::Empty))]
pub async fn reload_tokens(state: AppState) -> Result<Option<LoadReport>> {
    let token = state.sequencer.issue(ARBITRAGE_TARGET);
    let load_id = kaspa_lens_util::generate_load_id();
    tracing::Span::current().record("load_id", load_id.as_str());

    let tickers = market_tickers(&state).await?;
    let loader = TokenLoader::builder()
        .source(state.upstreams.kasfyi.clone())
        .tickers(tickers)
        .batch_size(state.setting.market.batch_size)
        .build();

    let mut events = std::pin::pin!(loader.load());

    while let Some(event) = events.next().await {
        let mut market = state.market.write().await;

        // 持有写锁后再检查，避免与新的加载交错
        if !state.sequencer.is_current(&token) {
            tracing::debug!("token load superseded");
            return Ok(None);
        }

        match event {
            LoadEvent::Started { total } => {
                market.tokens.clear();
                market.progress = Some(LoadProgress { current: 0, total });
            }
            LoadEvent::Batch {
                tokens,
                current,
                total,
            } => {
                market.tokens.extend(tokens);
                market.progress = Some(LoadProgress { current, total });
                tracing::debug!(current, total, "token batch loaded");
            }
            LoadEvent::Finished(report) => {
                market.progress = None;
                market.loaded_at = Some(Utc::now());
                market.report = Some(report.clone());
                tracing::info!(loaded = report.loaded, failed = report.failed.len(), "tokens loaded");
                return Ok(Some(report));
            }
        }
    }

    Ok(None)
}

// 定时轮询最近铸造，关注集合出现新铸造时记录日志
pub async fn poll_mints(state: AppState, period: Duration, cancel_token: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {
                let mints = match state
                    .upstreams
                    .new_mints
                    .recent_mints::<RecentMint>(None, None)
                    .await
                {
                    Ok(mints) => mints.data,
                    Err(e) => {
                        tracing::warn!("recent mints unavailable: {}", e);
                        continue;
                    }
                };

                for mint in state.mints.lock().await.observe(&mints) {
                    tracing::info!(tick = %mint.tick, id = mint.id, "new mint");
                }
            }
        }
    }

    tracing::debug!("mint poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tickers_from_listing() {
        let listing = vec![
            json!({"ticker": "NACHO", "changePrice": 1.2}),
            json!({"name": "no ticker"}),
            json!({"ticker": "KASPY"}),
        ];
        assert_eq!(tickers_from_listing(&listing), vec!["NACHO", "KASPY"]);
    }
}
