use async_stream::stream;
use futures::{future, Future, Stream};
use itertools::Itertools;
use kaspa_lens_base::{Ticker, Token};
use kaspa_lens_client::{ClientError, KasFyiClient};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 单个代币行情的来源
pub trait TokenSource: Send + Sync {
    fn token_markets(
        &self,
        ticker: &Ticker,
    ) -> impl Future<Output = Result<Token, ClientError>> + Send;
}

impl TokenSource for KasFyiClient {
    async fn token_markets(&self, ticker: &Ticker) -> Result<Token, ClientError> {
        KasFyiClient::token_markets(self, ticker.as_ref()).await
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: Vec<Ticker>,
}

#[derive(Debug, Clone)]
pub enum LoadEvent {
    Started { total: usize },
    Batch { tokens: Vec<Token>, current: usize, total: usize },
    Finished(LoadReport),
}

pub struct TokenLoader<S> {
    source: Arc<S>,
    tickers: Vec<Ticker>,
    batch_size: usize,
}

#[bon::bon]
impl<S: TokenSource + 'static> TokenLoader<S> {
    #[builder]
    pub fn new(
        source: Arc<S>,
        tickers: Vec<String>,
        #[builder(default = DEFAULT_BATCH_SIZE)] batch_size: usize,
    ) -> Self {
        // 去掉引号和空白后去重，保持原顺序
        let tickers = tickers
            .iter()
            .filter_map(|raw| Ticker::clean(raw))
            .unique()
            .collect();

        TokenLoader {
            source,
            tickers,
            batch_size: batch_size.max(1),
        }
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    // 分批并发请求，每批完成后推送一次进度
    pub fn load(&self) -> impl Stream<Item = LoadEvent> + Send + 'static {
        let source = Arc::clone(&self.source);
        let tickers = self.tickers.clone();
        let batch_size = self.batch_size;

        stream! {
            let total = tickers.len();
            let mut report = LoadReport::default();

            yield LoadEvent::Started { total };

            for (index, batch) in tickers.chunks(batch_size).enumerate() {
                let results = future::join_all(
                    batch.iter().map(|ticker| source.token_markets(ticker)),
                )
                .await;

                let mut tokens = Vec::with_capacity(batch.len());

                for (ticker, result) in batch.iter().zip(results) {
                    match result {
                        Ok(token) => tokens.push(token),
                        Err(e) => {
                            tracing::debug!(%ticker, error = %e, "token info unavailable");
                            report.failed.push(ticker.clone());
                        }
                    }
                }

                report.loaded += tokens.len();
                let current = ((index + 1) * batch_size).min(total);

                yield LoadEvent::Batch { tokens, current, total };
            }

            if !report.failed.is_empty() {
                tracing::warn!(
                    loaded = report.loaded,
                    failed = report.failed.len(),
                    "some tokens failed to load"
                );
            }

            yield LoadEvent::Finished(report);
        }
    }

    /// 一次性加载全部代币
    pub async fn load_all(&self) -> (Vec<Token>, LoadReport) {
        use futures::StreamExt;

        let mut tokens = Vec::new();
        let mut report = LoadReport::default();
        let mut events = std::pin::pin!(self.load());

        while let Some(event) = events.next().await {
            match event {
                LoadEvent::Batch { tokens: batch, .. } => tokens.extend(batch),
                LoadEvent::Finished(r) => report = r,
                LoadEvent::Started { .. } => {}
            }
        }

        (tokens, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use kaspa_lens_base::MarketQuote;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
    }

    impl TokenSource for FakeSource {
        async fn token_markets(&self, ticker: &Ticker) -> Result<Token, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if ticker.as_ref().starts_with("BAD") {
                return Err(ClientError::Status {
                    status: 404,
                    url: format!("https://example.invalid/{ticker}"),
                });
            }

            let quote = MarketQuote::builder()
                .exchange_name("MEXC")
                .price_usd(1.0)
                .volume_usd(1.0)
                .build();

            Ok(Token::new(ticker, vec![quote]))
        }
    }

    fn loader(source: Arc<FakeSource>, tickers: &[&str], batch_size: usize) -> TokenLoader<FakeSource> {
        TokenLoader::builder()
            .source(source)
            .tickers(tickers.iter().map(|t| t.to_string()).collect())
            .batch_size(batch_size)
            .build()
    }

    #[test]
    fn test_tickers_cleaned_and_deduped() {
        let loader = loader(
            Arc::new(FakeSource::default()),
            &["NACHO", "'NACHO'", " KASPY ", "\"\"", "BURT"],
            10,
        );

        let tickers = loader.tickers().iter().map(|t| t.to_string()).collect::<Vec<_>>();
        assert_eq!(tickers, vec!["NACHO", "KASPY", "BURT"]);
    }

    #[tokio::test]
    async fn test_load_in_batches() -> anyhow::Result<()> {
        let source = Arc::new(FakeSource::default());
        let loader = loader(Arc::clone(&source), &["A", "BAD1", "C", "D", "BAD2"], 2);

        let events = loader.load().collect::<Vec<_>>().await;
        assert_eq!(events.len(), 5);

        let progress = events
            .iter()
            .filter_map(|event| match event {
                LoadEvent::Batch { current, total, .. } => Some((*current, *total)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(progress, vec![(2, 5), (4, 5), (5, 5)]);

        match events.last() {
            Some(LoadEvent::Finished(report)) => {
                assert_eq!(report.loaded, 3);
                assert_eq!(report.failed, vec![Ticker::new("BAD1"), Ticker::new("BAD2")]);
            }
            other => anyhow::bail!("unexpected last event: {other:?}"),
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_all() {
        let loader = loader(Arc::new(FakeSource::default()), &["A", "B", "BAD"], 100);
        let (tokens, report) = loader.load_all().await;

        assert_eq!(tokens.len(), 2);
        assert_eq!(report.failed.len(), 1);
    }
}
