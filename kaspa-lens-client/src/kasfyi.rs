use crate::{ClientError, UpstreamClient};
use kaspa_lens_base::{MarketQuote, Token};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub ticker: String,
    #[serde(default)]
    pub markets_data: Option<Vec<MarketInfo>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub name: String,
    #[serde(default)]
    pub market_data: Option<MarketData>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(default)]
    pub price_in_usd: Option<f64>,
    #[serde(default)]
    pub volume_in_usd: Option<f64>,
}

impl From<TokenInfo> for Token {
    // 没有行情数据或价格的市场直接丢弃
    fn from(info: TokenInfo) -> Self {
        let markets = info
            .markets_data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|market| {
                let data = market.market_data?;
                let price = data.price_in_usd?;

                Some(
                    MarketQuote::builder()
                        .exchange_name(market.name)
                        .price_usd(price)
                        .volume_usd(data.volume_in_usd.unwrap_or(0.0))
                        .build(),
                )
            })
            .collect();

        Token::new(info.ticker, markets)
    }
}

// kas.fyi 的 KRC-20 行情与K线
#[derive(Debug, Clone)]
pub struct KasFyiClient {
    client: UpstreamClient,
}

impl KasFyiClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
        KasFyiClient {
            client: UpstreamClient::new(http, base),
        }
    }

    pub async fn token_info(&self, ticker: &str) -> Result<Value, ClientError> {
        self.client
            .get_json(&["token", "krc20", ticker, "info"], &[])
            .await
    }

    pub async fn token_markets(&self, ticker: &str) -> Result<Token, ClientError> {
        let value = self.token_info(ticker).await?;
        let info: TokenInfo = serde_json::from_value(value)?;
        Ok(info.into())
    }

    pub async fn candles(&self, ticker: &str, interval: &str) -> Result<Value, ClientError> {
        self.client
            .get_json(
                &["token", "krc20", ticker, "charts"],
                &[
                    ("type", "candles".to_string()),
                    ("interval", interval.to_string()),
                ],
            )
            .await
    }
}
